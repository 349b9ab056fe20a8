//! urlsentry core - URL features and classification
//!
//! - **urlparts**: generic-syntax URL splitting (scheme, netloc, path, ...)
//! - **features**: the 21 lexical features the classifier was trained on
//! - **model**: JSON classifier artifacts (decision tree, random forest,
//!   logistic regression) and hard-label inference
//!
//! ```
//! use urlsentry_core::{extract, FEATURE_COUNT};
//!
//! let features = extract("http://bit.ly/login-update");
//! assert_eq!(features.short_url, 1);
//! assert_eq!(features.to_row().len(), FEATURE_COUNT);
//! ```

pub mod error;
pub mod features;
pub mod model;
pub mod urlparts;

pub use error::{ModelError, Result};
pub use features::{extract, FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
pub use model::{Classifier, Estimator, Label, Tree};
pub use urlparts::UrlParts;
