//! sRGB → CIE L*a*b* (D65) and color-difference helpers.

use std::sync::OnceLock;

static SRGB_TO_LINEAR_LUT: OnceLock<[f32; 256]> = OnceLock::new();

#[inline]
fn srgb_to_linear(v: u8) -> f32 {
    let table = SRGB_TO_LINEAR_LUT.get_or_init(|| {
        let mut table = [0.0f32; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            let c = i as f32 / 255.0;
            *slot = if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            };
        }
        table
    });
    table[v as usize]
}

#[inline]
fn lab_f(t: f32) -> f32 {
    const EPS: f32 = 216.0 / 24389.0;
    const KAPPA: f32 = 24389.0 / 27.0;
    if t > EPS {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

/// CIE L*a*b* triple.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    pub fn from_rgb(rgb: [u8; 3]) -> Self {
        let r = srgb_to_linear(rgb[0]);
        let g = srgb_to_linear(rgb[1]);
        let b = srgb_to_linear(rgb[2]);
        // D65 white point normalization folded into the matrix rows.
        let x = (0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b) / 0.950_47;
        let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175 * b;
        let z = (0.019_333_9 * r + 0.119_192 * g + 0.950_304_1 * b) / 1.088_83;
        let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
        Self {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }

    /// Distance from the neutral axis.
    pub fn chroma(&self) -> f32 {
        self.a.hypot(self.b)
    }

    /// CIE76 ΔE.
    pub fn delta_e(&self, other: &Lab) -> f32 {
        ((self.l - other.l).powi(2) + (self.a - other.a).powi(2) + (self.b - other.b).powi(2)).sqrt()
    }
}

/// Median of `values`; reorders the slice. `None` when empty.
pub(crate) fn median_in_place(values: &mut [f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mid = values.len() / 2;
    let (_, m, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    Some(*m)
}

/// Channel-wise median of a set of Lab samples.
pub(crate) fn median_lab(samples: &[Lab]) -> Option<Lab> {
    let mut buf: Vec<f32> = samples.iter().map(|c| c.l).collect();
    let l = median_in_place(&mut buf)?;
    buf.iter_mut().zip(samples).for_each(|(v, c)| *v = c.a);
    let a = median_in_place(&mut buf)?;
    buf.iter_mut().zip(samples).for_each(|(v, c)| *v = c.b);
    let b = median_in_place(&mut buf)?;
    Some(Lab { l, a, b })
}
