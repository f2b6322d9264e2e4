//! Sparsity of the dynamic weights and the blending.

pub use super::*;

impl<B: Backend> DynamicObjective<B> {
    /// `entropy(weights_d) + entropy(blending)`
    ///
    /// ## Arguments
    ///
    /// * `weights_dynamic` - The density weights of the dynamic branch with shape `[N, S]`.
    /// * `blending` - The blending weights with shape `[N, S]` or `[N, 1]`.
    pub fn get_sparsity_loss(
        &self,
        weights_dynamic: Tensor<B, 2>,
        blending: Tensor<B, 2>,
    ) -> Tensor<B, 1> {
        self.metric_entropy
            .evaluate(weights_dynamic)
            .add(self.metric_entropy.evaluate(blending))
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn get_sparsity_loss() {
        use super::*;
        use burn::backend::NdArray;

        let device = Default::default();
        let objective = DynamicObjective::<NdArray>::init(
            Intrinsics::new(1, 2, 1.0),
            LossWeights::default(),
            &device,
        );

        let one_hot = Tensor::from_floats([[0.0, 1.0], [1.0, 0.0]], &device);
        let uniform = Tensor::from_floats([[0.5, 0.5], [0.5, 0.5]], &device);

        let output = objective
            .get_sparsity_loss(one_hot.to_owned(), one_hot.to_owned())
            .into_scalar();
        assert!(output.abs() < 1e-6, "output: {output}");

        // ln(2) + 0
        let output = objective
            .get_sparsity_loss(uniform.to_owned(), one_hot)
            .into_scalar();
        let target = 2.0_f32.ln();
        assert!((output - target).abs() < 1e-5, "output: {output}");
    }
}
