/// Background cloud layer.
///
/// Each cloud drifts right at its own speed and scrolls with the camera
/// scaled by its depth, so nearer clouds move faster. Positions wrap
/// around the view, so a handful of clouds cover an endless sky.

use rand::Rng;

use crate::domain::geom::{IVec, Rect, Vec2};

pub const CLOUD_COUNT: usize = 16;

/// Pixel size of one cloud.
pub const CLOUD_W: i32 = 32;
pub const CLOUD_H: i32 = 16;

#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    pub speed: f32,
    /// 0.1..0.6; how strongly the camera moves this cloud.
    pub depth: f32,
}

impl Cloud {
    /// Top-left corner in view pixels for a camera at `scroll`.
    pub fn screen_pos(&self, scroll: IVec, view_w: i32, view_h: i32) -> IVec {
        let x = self.pos.x - scroll.x as f32 * self.depth;
        let y = self.pos.y - scroll.y as f32 * self.depth;
        IVec::new(
            (x as i32).rem_euclid(view_w + CLOUD_W) - CLOUD_W,
            (y as i32).rem_euclid(view_h + CLOUD_H) - CLOUD_H,
        )
    }
}

pub struct Clouds {
    clouds: Vec<Cloud>,
}

impl Clouds {
    /// Farthest clouds first, so nearer ones draw over them.
    pub fn new<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        let mut clouds: Vec<Cloud> = (0..count)
            .map(|_| Cloud {
                pos: Vec2::new(rng.gen::<f32>() * 99999.0, rng.gen::<f32>() * 99999.0),
                speed: rng.gen::<f32>() * 0.04 + 0.02,
                depth: rng.gen::<f32>() * 0.5 + 0.1,
            })
            .collect();
        clouds.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        Clouds { clouds }
    }

    pub fn update(&mut self) {
        for cloud in &mut self.clouds {
            cloud.pos.x += cloud.speed;
        }
    }

    /// World-space rects of every cloud as seen from `scroll`.
    pub fn rects(&self, scroll: IVec, view_w: i32, view_h: i32) -> impl Iterator<Item = (Rect, f32)> + '_ {
        self.clouds.iter().map(move |c| {
            let s = c.screen_pos(scroll, view_w, view_h);
            (Rect::new(s.x + scroll.x, s.y + scroll.y, CLOUD_W, CLOUD_H), c.depth)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;

    fn cloud(x: f32, depth: f32) -> Cloud {
        Cloud { pos: Vec2::new(x, 20.0), speed: 0.05, depth }
    }

    #[test]
    fn screen_pos_wraps_around_the_view() {
        let c = cloud(0.0, 0.5);
        assert_eq!(c.screen_pos(IVec::new(0, 0), 320, 180), IVec::new(-CLOUD_W, 20 - CLOUD_H));
        // Just past the right edge comes back in from the left.
        let c = cloud((320 + CLOUD_W) as f32 + 10.0, 0.5);
        assert_eq!(c.screen_pos(IVec::new(0, 0), 320, 180).x, 10 - CLOUD_W);
    }

    #[test]
    fn nearer_clouds_scroll_faster() {
        let far = cloud(200.0, 0.25);
        let near = cloud(200.0, 0.5);
        let scroll = IVec::new(100, 0);
        let far_x = far.screen_pos(scroll, 320, 180).x;
        let near_x = near.screen_pos(scroll, 320, 180).x;
        assert_eq!(far_x, 175 - CLOUD_W);
        assert_eq!(near_x, 150 - CLOUD_W);
    }

    #[test]
    fn clouds_drift_and_sort_by_depth() {
        let mut clouds = Clouds::new(&mut StepRng::new(0, 0x1000_0000), CLOUD_COUNT);
        assert_eq!(clouds.clouds.len(), CLOUD_COUNT);
        assert!(clouds.clouds.windows(2).all(|w| w[0].depth <= w[1].depth));

        let before: Vec<f32> = clouds.clouds.iter().map(|c| c.pos.x).collect();
        clouds.update();
        for (c, x) in clouds.clouds.iter().zip(before) {
            assert!(c.pos.x > x);
            assert!((0.02..=0.06).contains(&c.speed));
        }
    }
}
