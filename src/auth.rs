use anyhow::Context;
use log::warn;
use serde_json::Value;

/// What the signed-in user is allowed to do. Produced once at the boundary
/// from the auth provider's claims and passed around explicitly; nothing
/// downstream re-inspects tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities {
    pub approved: bool,
    pub admin: bool,
}

impl Capabilities {
    /// Internal staff (`role == "internal"`) are approved; the admin flag
    /// only counts for approved users.
    pub fn from_claims(claims: &Value) -> Self {
        let approved = claims.get("role").and_then(Value::as_str) == Some("internal");
        let admin = approved && claims.get("admin").and_then(Value::as_bool) == Some(true);
        Self { approved, admin }
    }

    pub fn require_approved(&self) -> anyhow::Result<()> {
        if self.approved {
            Ok(())
        } else {
            anyhow::bail!("not authorized: this account is not approved for internal data")
        }
    }

    pub fn require_admin(&self) -> anyhow::Result<()> {
        self.require_approved()?;
        if self.admin {
            Ok(())
        } else {
            anyhow::bail!("not authorized: admin access required")
        }
    }
}

/// Asks the backing API who the token belongs to. Any failure here means
/// unapproved; the caller decides whether that is fatal.
pub async fn fetch_capabilities(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> anyhow::Result<Capabilities> {
    let url = format!("{}/me", base_url.trim_end_matches('/'));
    let response = client
        .get(&url)
        .bearer_auth(token)
        .send()
        .await
        .with_context(|| format!("failed to reach auth endpoint at {url}"))?;

    let status = response.status();
    if !status.is_success() {
        warn!("auth endpoint returned {status}");
        anyhow::bail!("auth check failed with {status}");
    }

    let claims: Value = response
        .json()
        .await
        .context("auth endpoint returned a non-JSON body")?;
    Ok(Capabilities::from_claims(&claims))
}

/// Sends an admin invite for the given email address. The caller is expected
/// to have passed `require_admin` already; the server enforces it again.
pub async fn invite_user(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
    email: &str,
) -> anyhow::Result<()> {
    let url = format!("{}/invite", base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .bearer_auth(token)
        .json(&serde_json::json!({ "email": email }))
        .send()
        .await
        .with_context(|| format!("failed to reach invite endpoint at {url}"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("failed to send invite: {status} {body}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn internal_role_is_approved() {
        let caps = Capabilities::from_claims(&json!({ "role": "internal" }));
        assert!(caps.approved);
        assert!(!caps.admin);
        assert!(caps.require_approved().is_ok());
        assert!(caps.require_admin().is_err());
    }

    #[test]
    fn internal_admin_gets_both_flags() {
        let caps = Capabilities::from_claims(&json!({ "role": "internal", "admin": true }));
        assert!(caps.approved);
        assert!(caps.admin);
        assert!(caps.require_admin().is_ok());
    }

    #[test]
    fn external_role_is_never_admin() {
        let caps = Capabilities::from_claims(&json!({ "role": "guest", "admin": true }));
        assert!(!caps.approved);
        assert!(!caps.admin);
        assert!(caps.require_approved().is_err());
    }

    #[test]
    fn empty_claims_grant_nothing() {
        let caps = Capabilities::from_claims(&json!({}));
        assert!(!caps.approved);
        assert!(!caps.admin);
    }
}
