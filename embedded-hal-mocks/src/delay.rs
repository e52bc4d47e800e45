use embedded_hal::delay;
use mockall::mock;

mock! {
    #[derive(Debug)]
    pub Delay {}

    impl delay::DelayNs for Delay {
        fn delay_ns(&mut self, ns: u32);
        fn delay_us(&mut self, us: u32);
        fn delay_ms(&mut self, ms: u32);
    }
}

impl MockDelay {
    /// A delay that accepts any number of calls of any duration.
    pub fn permissive() -> Self {
        let mut delay = Self::new();
        delay.expect_delay_ns().return_const(());
        delay.expect_delay_us().return_const(());
        delay.expect_delay_ms().return_const(());
        delay
    }
}
