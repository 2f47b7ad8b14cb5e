use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use url::Url;

/// The parts of a WebID profile document the gateway cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebIdProfile {
    /// The WebID this profile describes (usually ends in `#me`).
    pub webid: Url,
    /// Pod roots declared with `pim:storage`.
    pub storages: BTreeSet<Url>,
}

impl WebIdProfile {
    pub fn new(webid: Url) -> Self {
        Self {
            webid,
            storages: BTreeSet::new(),
        }
    }
}
