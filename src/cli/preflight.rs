//! Pre-flight checks before commands that call OpenAI.

use crate::error::Result;
use crate::openai::require_api_key;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking questions needs the completion and embedding APIs.
    Ask,
    /// Search needs the embedding API.
    Search,
    /// The server only warns; `/chat` reports a missing credential per request.
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::Ask | Operation::Search | Operation::Serve => require_api_key(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operation_checks_the_key() {
        let expected = require_api_key().is_ok();
        for operation in [Operation::Ask, Operation::Search, Operation::Serve] {
            assert_eq!(check(operation).is_ok(), expected, "{:?}", operation);
        }
    }
}
