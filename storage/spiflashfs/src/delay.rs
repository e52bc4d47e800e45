use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// Block for `duration` at millisecond resolution.
/// Durations longer than `u32::MAX` ms are split into several delays.
pub fn delay_for<D: DelayNs>(delay: &mut D, duration: Duration) {
    let mut remaining = duration.as_millis();
    while remaining > 0 {
        let ms = u32::try_from(remaining).unwrap_or(u32::MAX);
        delay.delay_ms(ms);
        remaining -= ms as u128;
    }
}

#[cfg(test)]
mod tests {
    use embedded_hal_mocks::delay::MockDelay;
    use mockall::{predicate::eq, Sequence};

    use super::*;

    #[test]
    fn short_delay_is_a_single_call() {
        let mut delay = MockDelay::new();
        delay.expect_delay_ms().with(eq(1500)).times(1).return_const(());

        delay_for(&mut delay, Duration::from_millis(1500));
    }

    #[test]
    fn long_delay_is_split() {
        // Given
        let mut seq = Sequence::new();
        let mut delay = MockDelay::new();
        delay
            .expect_delay_ms()
            .with(eq(u32::MAX))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());
        delay
            .expect_delay_ms()
            .with(eq(705))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(());

        // When
        delay_for(&mut delay, Duration::from_secs(4_294_968));

        // Then
        delay.checkpoint();
    }

    #[test]
    fn zero_delay_does_nothing() {
        let mut delay = MockDelay::new();
        delay.expect_delay_ms().never();

        delay_for(&mut delay, Duration::ZERO);
    }
}
