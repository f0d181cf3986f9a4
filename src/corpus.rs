//! The fixed documentation corpus the assistant retrieves from.
//!
//! One hand-authored document per supported Customer Data Platform. Each
//! document opens with `"<Platform> Documentation:"` and names its platform
//! in every paragraph so chunks stay attributable after splitting.

/// A supported Customer Data Platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Segment,
    MParticle,
    Lytics,
    Zeotap,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Segment,
        Platform::MParticle,
        Platform::Lytics,
        Platform::Zeotap,
    ];

    /// Display name, also the marker word searched for in chunk text.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::Segment => "Segment",
            Platform::MParticle => "mParticle",
            Platform::Lytics => "Lytics",
            Platform::Zeotap => "Zeotap",
        }
    }

    /// Label shown in front of retrieved context.
    pub fn label(&self) -> String {
        format!("{} Documentation", self.name())
    }

    /// The platform whose marker word appears earliest in `text`.
    pub fn detect(text: &str) -> Option<Platform> {
        Platform::ALL
            .iter()
            .filter_map(|p| text.find(p.name()).map(|pos| (pos, *p)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, p)| p)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One long-form documentation block.
#[derive(Debug, Clone, Copy)]
pub struct CorpusDocument {
    pub platform: Platform,
    pub text: &'static str,
}

/// The built-in corpus.
pub const CORPUS: &[CorpusDocument] = &[
    CorpusDocument {
        platform: Platform::Segment,
        text: "Segment Documentation: To set up a new source in Segment:
1. Navigate to Connections > Sources in your Segment workspace
2. Click 'Add Source' and choose your platform from the catalog
3. Name the source and follow the integration guide for your specific library
4. Copy the write key and configure the connection settings in your code
5. Enable the source and verify data flow in the Segment Debugger
Segment destinations are connected per source: open the source, click 'Add Destination', pick a tool from the catalog, enter its credentials and enable it. Use Segment Protocols to define a tracking plan so events that violate the plan are flagged or blocked before they reach destinations.",
    },
    CorpusDocument {
        platform: Platform::MParticle,
        text: "mParticle Documentation: Creating user profiles involves:
1. Implementing the mParticle SDK on web, iOS or Android
2. Collecting user attributes and events with the SDK or the Events API
3. Setting user identities (customer ID, email) through the mParticle IDSync API
4. Managing user consent with GDPR and CCPA consent states
5. Viewing user profiles in the mParticle dashboard under Activity > User Activity
mParticle resolves identities according to the identity strategy of the workspace, so a login call can merge an anonymous profile into a known one. Connect outputs in mParticle by adding an integration under Directory, configuring it, and linking it to an input under Connections.",
    },
    CorpusDocument {
        platform: Platform::Lytics,
        text: "Lytics Documentation: Building audience segments requires:
1. Accessing the Audience Builder in Lytics
2. Defining segment criteria from user fields and behavioural scores
3. Selecting behavioral triggers such as visits, purchases or email engagement
4. Setting audience rules with AND/OR conditions and content affinity
5. Activating the segment to an export job or a marketing channel
Lytics collects data through the JavaScript tag and data import jobs, and builds profiles by merging streams on shared identifiers. Lytics audiences update in real time, so an activated audience keeps syncing to the connected channel as users enter and leave it.",
    },
    CorpusDocument {
        platform: Platform::Zeotap,
        text: "Zeotap Documentation: Data integration steps include:
1. Setting up data sources in Zeotap from files, SDKs or server-to-server APIs
2. Configuring data mappings from source fields to the Zeotap catalogue
3. Validating data quality with the preview and error reports
4. Managing identity resolution across emails, phone numbers and device IDs
5. Monitoring data flows in the Zeotap data ingestion dashboard
Zeotap unifies profiles in its identity graph and applies consent from the customer's consent management platform before activation. Build audiences in Zeotap with the Audience tool and activate them to advertising and marketing destinations.",
    },
];

/// Join documents into the single text the chunker splits.
pub fn joined(documents: &[CorpusDocument]) -> String {
    documents
        .iter()
        .map(|d| d.text)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_covers_every_platform() {
        for platform in Platform::ALL {
            let doc = CORPUS.iter().find(|d| d.platform == platform).unwrap();
            assert!(doc.text.starts_with(&platform.label()));
            assert_eq!(Platform::detect(doc.text), Some(platform));
        }
    }

    #[test]
    fn test_detect_uses_earliest_marker() {
        assert_eq!(
            Platform::detect("Lytics audiences can be compared to Segment audiences"),
            Some(Platform::Lytics)
        );
        assert_eq!(Platform::detect("Zeotap and mParticle"), Some(Platform::Zeotap));
        assert_eq!(Platform::detect("no platform here"), None);
    }

    #[test]
    fn test_detect_is_case_sensitive() {
        // Lowercase "segments" is an ordinary word, not the platform.
        assert_eq!(Platform::detect("building audience segments"), None);
    }

    #[test]
    fn test_documents_fit_default_chunk_size() {
        for doc in CORPUS {
            assert!(doc.text.chars().count() <= 1000, "{} document too long", doc.platform);
        }
    }
}
