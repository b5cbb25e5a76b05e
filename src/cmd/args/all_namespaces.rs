use clap::ValueEnum;

/// `-A` / `-A=true|false`
#[derive(Debug, ValueEnum, Clone, Copy, PartialEq, Eq)]
pub enum AllNamespaces {
    True,
    False,
}

impl From<AllNamespaces> for bool {
    fn from(value: AllNamespaces) -> Self {
        matches!(value, AllNamespaces::True)
    }
}
