//! Shared helpers for the integration tests: NRMSE and best-phase-shift
//! alignment between a short original template and a longer generated run.

/// Linear upsampling by an integer rate.
pub fn upsample(signal: &[f64], rate: usize) -> Vec<f64> {
    if signal.len() < 2 {
        return signal.to_vec();
    }
    let mut out = Vec::with_capacity((signal.len() - 1) * rate + 1);
    for w in signal.windows(2) {
        for k in 0..rate {
            let t = k as f64 / rate as f64;
            out.push(w[0] * (1.0 - t) + w[1] * t);
        }
    }
    out.push(*signal.last().unwrap());
    out
}

/// Root-mean-square error normalized by the standard deviation of `truth`.
pub fn nrmse(pred: &[f64], truth: &[f64]) -> f64 {
    assert_eq!(pred.len(), truth.len());
    let n = truth.len() as f64;
    let mean = truth.iter().sum::<f64>() / n;
    let var = truth.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    let mse = pred
        .iter()
        .zip(truth.iter())
        .map(|(p, t)| (p - t) * (p - t))
        .sum::<f64>()
        / n;
    (mse / var.max(1e-12)).sqrt()
}

/// Minimum NRMSE over all phase shifts of `generated` against `template`,
/// both upsampled by `rate` for sub-sample alignment.
pub fn aligned_nrmse(template: &[f64], generated: &[f64], rate: usize) -> f64 {
    let tpl = upsample(template, rate);
    let gen = upsample(generated, rate);
    assert!(gen.len() >= tpl.len(), "generated run shorter than template");
    let mut best = f64::INFINITY;
    for s in 0..=(gen.len() - tpl.len()) {
        let e = nrmse(&gen[s..s + tpl.len()], &tpl);
        if e < best {
            best = e;
        }
    }
    best
}

#[test]
fn test_aligned_nrmse_finds_phase_shift() {
    let period = 10.0;
    let truth: Vec<f64> = (0..20)
        .map(|t| (2.0 * std::f64::consts::PI * t as f64 / period).sin())
        .collect();
    // same sine, shifted by 3.5 samples
    let shifted: Vec<f64> = (0..100)
        .map(|t| (2.0 * std::f64::consts::PI * (t as f64 + 3.5) / period).sin())
        .collect();
    // linear interpolation of the sine leaves a curvature residual, so the
    // aligned error is small but not zero
    let e = aligned_nrmse(&truth, &shifted, 20);
    assert!(e < 0.05, "aligned nrmse = {}", e);

    // unshifted comparison of the same slice is bad
    let raw = nrmse(&shifted[..20], &truth);
    assert!(raw > 0.5, "unaligned nrmse = {}", raw);
}
