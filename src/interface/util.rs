#[macro_export]
macro_rules! toJsFloat64Array {
    ($q:expr) => {
        Float64Array::from(
            $q.iter()
                .map(|qi| *qi as f64)
                .collect::<Vec<f64>>()
                .as_slice(),
        )
    };
}
