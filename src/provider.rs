//! Concrete text-generation backends.
//!
//! | Module | Feature | API |
//! |--------|---------|-----|
//! | `groq` | `provider-groq` | Groq (OpenAI-compatible chat completions) |

#[cfg(feature = "provider-groq")]
pub(crate) mod remote_common;

#[cfg(feature = "provider-groq")]
pub mod groq;
