use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tollgate_auth::{AccessTokenClaims, ClaimsCodec, ExpiryCheck, SessionConfig, SystemClock};

use crate::cli::{InspectArgs, OutputFormat};
use crate::output::{print_value, print_warning};

pub fn inspect(config: &SessionConfig, args: &InspectArgs, format: OutputFormat) -> Result<()> {
    let codec = ClaimsCodec::from_config(config, Arc::new(SystemClock))
        .context("Invalid session configuration")?;

    let check = if args.allow_expired {
        ExpiryCheck::Skip
    } else {
        ExpiryCheck::Enforce
    };

    let claims = codec
        .decode(&args.token, check)
        .context("Token rejected")?;

    let now = OffsetDateTime::now_utc();
    let expired = claims.is_expired_at(now);
    if expired {
        print_warning("Token is expired");
    }

    print_value(&claims_view(&claims, expired), format);
    Ok(())
}

fn claims_view(claims: &AccessTokenClaims, expired: bool) -> serde_json::Value {
    let rfc3339 = |ts: Option<OffsetDateTime>| ts.and_then(|t| t.format(&Rfc3339).ok());

    json!({
        "sub": claims.sub,
        "email": claims.email,
        "jti": claims.jti,
        "iss": claims.iss,
        "aud": claims.aud,
        "iat": claims.iat,
        "exp": claims.exp,
        "issuedAt": rfc3339(claims.issued_at()),
        "expiresAt": rfc3339(claims.expires_at()),
        "expired": expired,
    })
}
