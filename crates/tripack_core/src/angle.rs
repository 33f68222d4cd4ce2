//! Angle arithmetic in degrees.
//!
//! Orientations are periodic; all sector math works on angles normalized
//! into (-180, 180]. Headings follow the compass convention of the rest of
//! the crate: a heading of 0 degrees points along +Y and angles grow
//! clockwise, so the unit vector at heading `a` is `(sin a, cos a)`.

use crate::Vector;

/// Normalize an angle in degrees into (-180, 180].
pub fn normalize_angle(mut angle: f64) -> f64 {
    while angle > 180.0 {
        angle -= 360.0;
    }
    while angle <= -180.0 {
        angle += 360.0;
    }
    angle
}

/// Signed difference `fin - init`, normalized into (-180, 180].
pub fn angle_diff(init: f64, fin: f64) -> f64 {
    normalize_angle(fin - init)
}

/// Unit vector at a compass heading in degrees.
pub fn heading(angle_deg: f64) -> Vector {
    let rad = angle_deg.to_radians();
    Vector::new(rad.sin(), rad.cos())
}
