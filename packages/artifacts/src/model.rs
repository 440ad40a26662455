//! LSTM sequence-to-one network restored from a `burn` record.
//!
//! The network is one LSTM layer over a `[batch, sequence, 1]` input whose
//! final hidden state is projected to a single value. Hyper-parameters live
//! in a JSON [`LstmNetworkConfig`] next to a named MessagePack record of
//! the weights.

use std::path::Path;
use std::sync::Mutex;

use burn::{
    backend::{NdArray, ndarray::NdArrayDevice},
    config::Config,
    module::Module,
    nn::{Linear, LinearConfig, Lstm, LstmConfig},
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    tensor::{Tensor, TensorData, backend::Backend},
};
use viralcast_forecast::{ForecastError, SequenceModel};
use viralcast_forecast_models::SEQUENCE_LENGTH;

use crate::ArtifactError;

/// Hyper-parameters of [`LstmNetwork`].
#[derive(Config, Debug)]
pub struct LstmNetworkConfig {
    /// Features per time step.
    #[config(default = 1)]
    pub input_size: usize,
    /// Width of the LSTM hidden state.
    #[config(default = 64)]
    pub hidden_size: usize,
}

impl LstmNetworkConfig {
    /// Builds a network with freshly initialized weights.
    #[must_use]
    pub fn init<B: Backend>(&self, device: &B::Device) -> LstmNetwork<B> {
        LstmNetwork {
            lstm: LstmConfig::new(self.input_size, self.hidden_size, true).init(device),
            output: LinearConfig::new(self.hidden_size, 1).init(device),
        }
    }
}

#[derive(Module, Debug)]
pub struct LstmNetwork<B: Backend> {
    lstm: Lstm<B>,
    output: Linear<B>,
}

impl<B: Backend> LstmNetwork<B> {
    /// Maps `[batch, sequence, features]` to `[batch, 1]`.
    #[must_use]
    pub fn forward(&self, input: Tensor<B, 3>) -> Tensor<B, 2> {
        let (hidden, _) = self.lstm.forward(input, None);
        let [batch, sequence, hidden_size] = hidden.dims();

        // Only the last time step feeds the regression head
        let last = hidden
            .slice([0..batch, sequence - 1..sequence, 0..hidden_size])
            .reshape([batch, hidden_size]);

        self.output.forward(last)
    }
}

/// [`SequenceModel`] backed by an [`LstmNetwork`] on the CPU backend.
///
/// Inference is serialized through a mutex; the network itself is `Send`
/// but not shareable across threads.
pub struct LstmForecaster {
    network: Mutex<LstmNetwork<NdArray>>,
    device: NdArrayDevice,
}

impl LstmForecaster {
    #[must_use]
    pub fn new(network: LstmNetwork<NdArray>) -> Self {
        Self {
            network: Mutex::new(network),
            device: NdArrayDevice::Cpu,
        }
    }

    /// Restores a network from its config file and weight record.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Model`] if either file cannot be read or
    /// the record does not match the configured architecture.
    pub fn load(config_path: &Path, weights_path: &Path) -> Result<Self, ArtifactError> {
        let config = LstmNetworkConfig::load(config_path).map_err(|e| ArtifactError::Model {
            message: format!("failed to read {}: {e:?}", config_path.display()),
        })?;

        log::debug!(
            "LSTM config: input_size={} hidden_size={}",
            config.input_size,
            config.hidden_size
        );

        let device = NdArrayDevice::Cpu;
        let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
        let network = config
            .init::<NdArray>(&device)
            .load_file(weights_path.to_path_buf(), &recorder, &device)
            .map_err(|e| ArtifactError::Model {
                message: format!("failed to read {}: {e:?}", weights_path.display()),
            })?;

        Ok(Self::new(network))
    }
}

impl SequenceModel for LstmForecaster {
    fn predict(&self, window: &[f64]) -> Result<f64, ForecastError> {
        if window.len() != SEQUENCE_LENGTH {
            return Err(ForecastError::Inference {
                message: format!(
                    "expected a window of {SEQUENCE_LENGTH} values, got {}",
                    window.len()
                ),
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let values: Vec<f32> = window.iter().map(|v| *v as f32).collect();
        let input = Tensor::<NdArray, 3>::from_data(
            TensorData::new(values, [1, SEQUENCE_LENGTH, 1]),
            &self.device,
        );

        let network = self.network.lock().map_err(|_| ForecastError::Inference {
            message: "model lock poisoned".to_string(),
        })?;
        let output = network.forward(input).into_data();
        drop(network);

        output
            .iter::<f64>()
            .next()
            .ok_or_else(|| ForecastError::Inference {
                message: "model returned an empty tensor".to_string(),
            })
    }
}
