//! PR size classification taken from labels such as `size/M`.

use serde::{Serialize, Serializer};
use std::fmt;

/// The size bucket a pull request falls into.
///
/// Variant order is the report order: the known sizes smallest first, then any
/// unrecognised size labels alphabetically, then PRs without a size label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeLabel {
    XS,
    S,
    M,
    L,
    XL,
    XXL,
    /// A label carrying the size prefix with an unrecognised suffix.
    Other(String),
    Unlabeled,
}

impl SizeLabel {
    /// Classifies a PR from its labels. The first label with `prefix` wins.
    pub fn from_labels<S: AsRef<str>>(labels: &[S], prefix: &str) -> Self {
        labels
            .iter()
            .find_map(|label| label.as_ref().strip_prefix(prefix))
            .map(Self::from_suffix)
            .unwrap_or(SizeLabel::Unlabeled)
    }

    fn from_suffix(suffix: &str) -> Self {
        match suffix.trim().to_ascii_uppercase().as_str() {
            "XS" => SizeLabel::XS,
            "S" => SizeLabel::S,
            "M" => SizeLabel::M,
            "L" => SizeLabel::L,
            "XL" => SizeLabel::XL,
            "XXL" => SizeLabel::XXL,
            _ => SizeLabel::Other(suffix.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SizeLabel::XS => "XS",
            SizeLabel::S => "S",
            SizeLabel::M => "M",
            SizeLabel::L => "L",
            SizeLabel::XL => "XL",
            SizeLabel::XXL => "XXL",
            SizeLabel::Other(name) => name.as_str(),
            SizeLabel::Unlabeled => "no size label",
        }
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SizeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
