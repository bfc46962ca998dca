/// Screen fade between game phases.
///
/// The counter runs from -255 up past +255. Alpha peaks at zero, which is
/// where the screen is fully covered and the pending phase switch is
/// applied. `is_midpoint` holds for exactly one update per fade.

const FADE_LIMIT: i32 = 255;

#[derive(Clone, Debug)]
pub struct Transition {
    value: i32,
    speed: i32,
    active: bool,
    /// Updates since the counter crossed zero.
    done: u32,
}

impl Transition {
    pub fn new(speed: i32) -> Self {
        Transition {
            value: -FADE_LIMIT,
            speed: speed.clamp(1, FADE_LIMIT),
            active: false,
            done: 0,
        }
    }

    /// Begin a fade. Ignored while one is already running.
    pub fn start(&mut self) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.value = -FADE_LIMIT;
        self.done = 0;
        true
    }

    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        self.value += self.speed;
        if self.value >= 0 {
            self.done += 1;
        }
        if self.value > FADE_LIMIT {
            self.value = -FADE_LIMIT;
            self.active = false;
            self.done = 0;
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_midpoint(&self) -> bool {
        self.done == 1
    }

    /// Cover opacity, 0 (clear) to 255 (black).
    pub fn alpha(&self) -> u8 {
        if !self.active {
            return 0;
        }
        (FADE_LIMIT - self.value.abs()).clamp(0, FADE_LIMIT) as u8
    }
}
