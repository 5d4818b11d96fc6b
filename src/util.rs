//! Utility functions for the volcano-ble crate.

use std::future::Future;
use std::time::Duration;

/// Convert Celsius to Fahrenheit.
///
/// # Example
///
/// ```
/// use volcano_ble::celsius_to_fahrenheit;
///
/// let fahrenheit = celsius_to_fahrenheit(100.0);
/// assert!((fahrenheit - 212.0).abs() < 0.001);
/// ```
#[inline]
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// Convert Fahrenheit to Celsius.
///
/// # Example
///
/// ```
/// use volcano_ble::fahrenheit_to_celsius;
///
/// let celsius = fahrenheit_to_celsius(212.0);
/// assert!((celsius - 100.0).abs() < 0.001);
/// ```
#[inline]
pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

/// Race a future against a deadline, cancelling the loser.
///
/// Returns `Some(output)` if the future finishes first and `None` on timeout.
/// Dropping the losing future cancels it, so a timed-out BLE wait does not
/// linger and misattribute a later event to a new operation.
pub(crate) async fn race_with_timeout<F>(deadline: Duration, fut: F) -> Option<F::Output>
where
    F: Future,
{
    tokio::time::timeout(deadline, fut).await.ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_celsius_to_fahrenheit() {
        assert!((celsius_to_fahrenheit(0.0) - 32.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(100.0) - 212.0).abs() < 0.001);
        assert!((celsius_to_fahrenheit(-40.0) - (-40.0)).abs() < 0.001);
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert!((fahrenheit_to_celsius(32.0) - 0.0).abs() < 0.001);
        assert!((fahrenheit_to_celsius(212.0) - 100.0).abs() < 0.001);
        assert!((fahrenheit_to_celsius(-40.0) - (-40.0)).abs() < 0.001);
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_with_timeout_winner() {
        let result = race_with_timeout(Duration::from_secs(1), async { 42 }).await;
        assert_eq!(result, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_with_timeout_loser() {
        let result = race_with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            42
        })
        .await;
        assert_eq!(result, None);
    }
}
