//! Process-wide serving identity.

/// Environment variable carrying the serving region.
pub const REGION_ENV: &str = "FLY_REGION";

/// Environment variable carrying the raw allocation id.
pub const ALLOC_ID_ENV: &str = "FLY_ALLOC_ID";

/// The instance id is the allocation id up to the first separator.
const ALLOC_ID_SEPARATOR: char = '-';

/// Region and instance this process serves as.
///
/// Resolved once at startup and shared read-only with every request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstanceIdentity {
    region: String,
    instance_id: String,
}

impl InstanceIdentity {
    /// Build an identity from a region and a raw allocation id.
    pub fn new(region: impl Into<String>, alloc_id: &str) -> Self {
        let instance_id = alloc_id
            .split_once(ALLOC_ID_SEPARATOR)
            .map(|(head, _)| head)
            .unwrap_or(alloc_id);

        Self {
            region: region.into(),
            instance_id: instance_id.to_string(),
        }
    }

    /// Resolve the identity through `lookup`. Missing values become empty strings.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let region = lookup(REGION_ENV).unwrap_or_default();
        let alloc_id = lookup(ALLOC_ID_ENV).unwrap_or_default();
        Self::new(region, &alloc_id)
    }

    /// Resolve the identity from the process environment.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }
}
