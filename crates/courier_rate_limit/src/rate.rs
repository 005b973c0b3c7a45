//! Admission rates.

use governor::Quota;
use std::num::NonZeroU32;
use std::time::Duration;

/// Sustained admission rate of a token bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Rate {
    /// No rate limiting
    #[display("unlimited")]
    Unlimited,
    /// One admission per period
    #[display("1 per {:?}", _0)]
    Every(Duration),
}

impl Rate {
    /// `limit` admissions spread evenly over `window`.
    ///
    /// # Example
    ///
    /// ```
    /// use courier_rate_limit::Rate;
    /// use std::num::NonZeroU32;
    /// use std::time::Duration;
    ///
    /// let rate = Rate::per(NonZeroU32::new(4).unwrap(), Duration::from_secs(1));
    /// assert_eq!(rate, Rate::Every(Duration::from_millis(250)));
    /// ```
    pub fn per(limit: NonZeroU32, window: Duration) -> Self {
        Rate::Every(window / limit.get())
    }

    /// Governor quota for this rate, `None` when unlimited.
    pub(crate) fn quota(&self, burst: NonZeroU32) -> Option<Quota> {
        match self {
            Rate::Unlimited => None,
            Rate::Every(period) => Quota::with_period(*period).map(|q| q.allow_burst(burst)),
        }
    }
}
