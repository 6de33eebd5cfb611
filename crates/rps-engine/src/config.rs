//! Hub configuration.

use crate::error::{HubError, HubResult};
use chrono::Duration;
use rps_core::AccountId;

/// Six hours, the period the hub is deployed with unless told otherwise
pub const DEFAULT_SESSION_EXPIRATION_SECS: u64 = 6 * 3600;

/// Owner identity and session timing
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HubConfig {
    owner: AccountId,
    session_expiration_period: Duration,
}

impl HubConfig {
    /// Create a config, rejecting a zero expiration period
    pub fn new(owner: AccountId, session_expiration_secs: u64) -> HubResult<Self> {
        Ok(Self {
            owner,
            session_expiration_period: expiration_period_from_secs(session_expiration_secs)?,
        })
    }

    /// Create a config with the default six hour period
    pub fn with_default_period(owner: AccountId) -> Self {
        Self {
            owner,
            session_expiration_period: Duration::seconds(DEFAULT_SESSION_EXPIRATION_SECS as i64),
        }
    }

    pub fn owner(&self) -> AccountId {
        self.owner
    }

    pub fn session_expiration_period(&self) -> Duration {
        self.session_expiration_period
    }

    /// Owner-only. Returns the previous period.
    pub fn change_session_expiration_period(
        &mut self,
        caller: AccountId,
        new_secs: u64,
    ) -> HubResult<Duration> {
        if caller != self.owner {
            return Err(HubError::Unauthorized(caller));
        }
        let new_period = expiration_period_from_secs(new_secs)?;
        Ok(std::mem::replace(
            &mut self.session_expiration_period,
            new_period,
        ))
    }

    pub fn ensure_owner(&self, caller: AccountId) -> HubResult<()> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(HubError::Unauthorized(caller))
        }
    }
}

fn expiration_period_from_secs(secs: u64) -> HubResult<Duration> {
    if secs == 0 {
        return Err(HubError::InvalidExpirationPeriod);
    }
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or(HubError::InvalidExpirationPeriod)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_period_is_six_hours() {
        let owner = AccountId::new();
        let config = HubConfig::with_default_period(owner);
        assert_eq!(
            config.session_expiration_period().num_seconds() as u64,
            DEFAULT_SESSION_EXPIRATION_SECS
        );
        assert_eq!(
            config.session_expiration_period(),
            HubConfig::new(owner, DEFAULT_SESSION_EXPIRATION_SECS)
                .unwrap()
                .session_expiration_period()
        );
    }

    #[test]
    fn test_owner_changes_period() {
        let owner = AccountId::new();
        let mut config = HubConfig::with_default_period(owner);

        let previous = config
            .change_session_expiration_period(owner, 9 * 24 * 3600)
            .unwrap();

        assert_eq!(previous, Duration::hours(6));
        assert_eq!(config.session_expiration_period(), Duration::days(9));
    }

    #[test]
    fn test_non_owner_cannot_change_period() {
        let owner = AccountId::new();
        let mallory = AccountId::new();
        let mut config = HubConfig::with_default_period(owner);

        let result = config.change_session_expiration_period(mallory, 60);

        assert_eq!(result, Err(HubError::Unauthorized(mallory)));
        assert_eq!(config.session_expiration_period(), Duration::hours(6));
    }

    #[test]
    fn test_zero_period_rejected() {
        let owner = AccountId::new();
        assert_eq!(
            HubConfig::new(owner, 0),
            Err(HubError::InvalidExpirationPeriod)
        );

        let mut config = HubConfig::with_default_period(owner);
        assert_eq!(
            config.change_session_expiration_period(owner, 0),
            Err(HubError::InvalidExpirationPeriod)
        );
    }

    #[test]
    fn test_huge_period_rejected() {
        assert_eq!(
            HubConfig::new(AccountId::new(), u64::MAX),
            Err(HubError::InvalidExpirationPeriod)
        );
    }
}
