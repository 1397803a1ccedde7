use candle_core::{Result, Tensor};

/// Mean binary cross entropy of logits against `0/1` targets
///
/// Uses `max(x, 0) - x * y + ln(1 + exp(-|x|))`, which is stable for
/// logits of any magnitude.
///
/// # Examples
///
/// ```
/// use candle_core::{Device, Tensor};
/// use ncda::model::bce_with_logits;
///
/// let logits = Tensor::new(&[0.0f32, 0.0], &Device::Cpu).unwrap();
/// let targets = Tensor::new(&[1.0f32, 0.0], &Device::Cpu).unwrap();
/// let loss = bce_with_logits(&logits, &targets).unwrap().to_scalar::<f32>().unwrap();
/// assert!((loss - 2f32.ln()).abs() < 1e-6);
/// ```
pub fn bce_with_logits(logits: &Tensor, targets: &Tensor) -> Result<Tensor> {
    let positive = logits.relu()?;
    let product = (logits * targets)?;
    let soft = logits.abs()?.neg()?.exp()?.affine(1.0, 1.0)?.log()?;
    ((positive - product)? + soft)?.mean_all()
}
