use serde::{Deserialize, Serialize};
use url::Url;
use url::form_urlencoded;

use crate::ConsentError;

/// Query parameter carrying the credential identifier back to the caller.
pub const SIGNED_VC_PARAMETER: &str = "signedVcUrl";

/// Settings of a consent session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsentSettings {
    /// Query parameter the credential identifier is appended under.
    pub redirect_parameter: String,
}

impl Default for ConsentSettings {
    fn default() -> Self {
        Self {
            redirect_parameter: SIGNED_VC_PARAMETER.to_string(),
        }
    }
}

/// Append `parameter=<credential_id>` to the caller's redirect target.
///
/// Absolute and relative targets are both accepted; relative targets stay
/// relative, and an existing query or fragment is kept.
///
/// The identifier is form-encoded rather than pasted in raw. Identifiers made
/// of letters, digits and `-._*` appear unchanged (`vc123`); URL-shaped
/// identifiers have their `:/?&#` escaped, so a query parser reads back
/// exactly the identifier that was issued instead of a truncated one.
pub fn compose_redirect(
    target: &str,
    parameter: &str,
    credential_id: &str,
) -> Result<String, ConsentError> {
    match Url::parse(target) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(parameter, credential_id);
            Ok(url.into())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Ok(append_relative(target, parameter, credential_id))
        }
        Err(source) => Err(ConsentError::Redirect {
            target: target.to_string(),
            source,
        }),
    }
}

fn append_relative(target: &str, parameter: &str, credential_id: &str) -> String {
    let (location, fragment) = match target.split_once('#') {
        Some((location, fragment)) => (location, Some(fragment)),
        None => (target, None),
    };
    let pair = form_urlencoded::Serializer::new(String::new())
        .append_pair(parameter, credential_id)
        .finish();
    let separator = match location.find('?') {
        None => "?",
        Some(_) if location.ends_with('?') || location.ends_with('&') => "",
        Some(_) => "&",
    };

    let mut composed = format!("{location}{separator}{pair}");
    if let Some(fragment) = fragment {
        composed.push('#');
        composed.push_str(fragment);
    }
    composed
}
