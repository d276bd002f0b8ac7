//! Laplacian-variance sharpness estimate.

/// Variance of the 4-neighbour discrete Laplacian over interior pixels.
///
/// `gray` is a row-major luma buffer of `width * height` values. Low variance
/// means few strong edges, which signals blur. Regions narrower or shorter
/// than 3 pixels have no interior and return 0.
pub fn laplacian_variance(gray: &[f32], width: usize, height: usize) -> f64 {
    if width < 3 || height < 3 || gray.len() < width * height {
        return 0.0;
    }

    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut count = 0u64;

    for y in 1..height - 1 {
        let row = y * width;
        let up = row - width;
        let down = row + width;
        for x in 1..width - 1 {
            let lap = gray[up + x] as f64
                + gray[row + x - 1] as f64
                + gray[row + x + 1] as f64
                + gray[down + x] as f64
                - 4.0 * gray[row + x] as f64;
            sum += lap;
            sum_sq += lap * lap;
            count += 1;
        }
    }

    let n = count as f64;
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}
