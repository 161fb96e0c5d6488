use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wrapper for contact data (emails, phone numbers) that masks its value
/// in Debug/Display output so tracing macros cannot leak it. Serializes
/// to the real value for API responses.
#[derive(Clone, Deserialize)]
pub struct Masked<T>(pub T);

impl<T: fmt::Display> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: fmt::Display> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "********")
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_masked() {
        let email = Masked("citizen@example.org".to_string());
        assert_eq!(format!("{:?}", email), "********");
        assert_eq!(serde_json::to_string(&email).unwrap(), "\"citizen@example.org\"");
    }
}
