//! Client facade for the wellness coach chat.
//!
//! [`ChatSession`] keeps the visible transcript, talks to the coach API and
//! turns structured error bodies into [`ClientError`] variants:
//!
//! - `AI_LIMIT_REACHED` becomes [`ClientError::LimitReached`] and sets the
//!   remaining count to 0
//! - `THREAD_EXPIRED` becomes [`ClientError::ThreadExpired`]; sending again
//!   starts a fresh thread
//!
//! ```rust,no_run
//! use chat_client::{ChatSession, ClientConfig};
//! use coach_core::{wire::ChatRequest, ContextType, Language};
//!
//! # async fn example() -> Result<(), chat_client::ClientError> {
//! let session = ChatSession::new(ClientConfig::from_env()?)?;
//! let request = ChatRequest::new("How do I sleep better?", ContextType::General, Language::En);
//! match session.send_message(request).await {
//!     Ok(reply) => println!("{}", reply.assistant_message),
//!     Err(e) if e.is_limit_reached() => println!("upgrade to continue"),
//!     Err(e) => println!("error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod session;

pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::ClientError;
pub use session::{ChatMessage, ChatSession, Role};
