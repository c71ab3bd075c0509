use std::time::Instant;

// 프레임 시간 측정. 이번 프레임에서 잰 시간은 다음 프레임의 카메라 이동에 쓰임
#[derive(Debug)]
pub struct FrameClock {
    started: Option<Instant>,
    delta_ms: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            started: None,
            delta_ms: 0.0,
        }
    }

    // 프레임 시작. 이전 프레임이 걸린 시간(ms)을 돌려줌
    pub fn begin(&mut self) -> f32 {
        self.started = Some(Instant::now());
        self.delta_ms
    }

    pub fn end(&mut self) -> f32 {
        if let Some(started) = self.started.take() {
            self.delta_ms = started.elapsed().as_secs_f32() * 1000.0;
        }
        self.delta_ms
    }

    pub fn delta_ms(&self) -> f32 {
        self.delta_ms
    }

    pub fn fps(&self) -> f32 {
        if self.delta_ms > 0.0 {
            1000.0 / self.delta_ms
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn first_frame_sees_zero_delta() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.begin(), 0.0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn measured_time_feeds_the_next_frame() {
        let mut clock = FrameClock::new();

        clock.begin();
        thread::sleep(Duration::from_millis(5));
        let measured = clock.end();

        assert!(measured >= 5.0);
        assert_eq!(clock.begin(), measured);
    }

    #[test]
    fn end_without_begin_keeps_the_last_delta() {
        let mut clock = FrameClock::new();
        clock.begin();
        let measured = clock.end();

        assert_eq!(clock.end(), measured);
        assert_eq!(clock.delta_ms(), measured);
    }
}
