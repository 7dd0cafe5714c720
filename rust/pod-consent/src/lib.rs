#![warn(missing_docs)]

//! Consent-grant flow for Pod access requests.
//!
//! An application asks for access by sending a [`ConsentRequest`]: who it
//! is, the purposes it wants data for, and the modes each purpose needs on
//! which resources. A [`ConsentSession`] walks the user through answering
//! it. The user toggles purposes and modes, then approves or denies. Any
//! answer short of "some purpose and some access" is confirmed first. The
//! answer is submitted once to a [`ConsentIssuer`], and the issued
//! credential's identifier is handed back to the application on its
//! redirect target.
//!
//! ```rust,no_run
//! # async fn example(request: pod_consent::ConsentRequest) -> Result<(), Box<dyn std::error::Error>> {
//! use pod_access::AccessMode;
//! use pod_consent::{ConsentSession, Gate, HttpConsentIssuer, IssuerConfig};
//! use url::Url;
//!
//! let issuer = HttpConsentIssuer::new(IssuerConfig::new("https://vc.example"));
//! let mut session = ConsentSession::new(request);
//!
//! session.toggle_purpose("https://example.com/SomeSpecificPurpose")?;
//! session.toggle_access(
//!     &Url::parse("https://pod.example/alice/private/data/")?,
//!     AccessMode::Read,
//! )?;
//!
//! if let Gate::Confirm(confirmation) = session.approve()? {
//!     println!("{}: {}", confirmation.title, confirmation.content);
//!     session.confirm()?;
//! }
//!
//! session.submit(&issuer).await?;
//! let location = session.redirect()?;
//! println!("redirecting to {location}");
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod request;
pub use request::*;

mod selection;
pub use selection::*;

mod confirmation;
pub use confirmation::*;

mod credential;
pub use credential::*;

mod issuer;
pub use issuer::*;

mod redirect;
pub use redirect::*;

mod session;
pub use session::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
