use crate::bitmap::Bitmap;

/// Geometry of a matched corner marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Corner {
    /// length of both arms, corner pixel included
    pub arm: u32,
    /// width of both arms
    pub thickness: u32,
}

// Number of consecutive black pixels starting at (x, y) and stepping by (dx, dy)
fn run_length(bitmap: &Bitmap<'_>, x: i64, y: i64, dx: i64, dy: i64) -> i64 {
    let mut n = 0;
    while bitmap.is_black(x + n * dx, y + n * dy) {
        n += 1;
    }
    n
}

/// Tests whether `(x, y)` is the corner of a marker
///
/// A marker is a solid black "L": a vertical arm rising from the corner and a horizontal arm
/// extending right from it, both `arm` pixels long and `thickness` pixels wide, with
/// `arm >= 2` and `thickness < arm`. Inside its bounding box every other pixel is non-black,
/// and so is every in-image pixel of the one pixel ring around the box.
pub(crate) fn match_corner(bitmap: &Bitmap<'_>, x: u32, y: u32) -> Option<Corner> {
    let (x, y) = (i64::from(x), i64::from(y));
    if !bitmap.is_black(x, y) || bitmap.is_black(x - 1, y) || bitmap.is_black(x, y + 1) {
        return None;
    }

    let arm = run_length(bitmap, x, y, 1, 0);
    if arm < 2 || run_length(bitmap, x, y, 0, -1) != arm {
        return None;
    }
    // measured at the far end of the horizontal arm, where it is not shared with the vertical one
    let thickness = run_length(bitmap, x + arm - 1, y, 0, -1);
    if thickness >= arm {
        return None;
    }

    for v in (y - arm)..=(y + 1) {
        for u in (x - 1)..=(x + arm) {
            let in_box = (x..x + arm).contains(&u) && (y - arm + 1..=y).contains(&v);
            let in_arm = u < x + thickness || v > y - thickness;
            if bitmap.is_black(u, v) != (in_box && in_arm) {
                return None;
            }
        }
    }

    Some(Corner {
        arm: u32::try_from(arm).ok()?,
        thickness: u32::try_from(thickness).ok()?,
    })
}
