//! Weather station: a bounded random walk around a mean temperature.

use rand::Rng;
use tokio::task::JoinHandle;

use homesim_app::jitter::Jitter;
use homesim_app::ports::{Simulation, SimulationContext};
use homesim_domain::error::{HomeSimError, ValidationError};

/// Largest move between two consecutive readings, as a fraction of the
/// amplitude.
const MAX_STEP_RATIO: f64 = 0.25;

/// How the outdoor temperature behaves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherSettings {
    /// Temperature the walk starts from and wanders around.
    pub mean: f64,
    /// Readings stay within `mean ± amplitude`.
    pub amplitude: f64,
    /// Delay between two readings.
    pub schedule: Jitter,
}

/// Pure state of the random walk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherModel {
    mean: f64,
    amplitude: f64,
    current: f64,
}

impl WeatherModel {
    /// Start a walk at `mean`. A negative amplitude is treated as its
    /// absolute value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteTemperature`] when `mean` or
    /// `amplitude` is not finite.
    pub fn new(mean: f64, amplitude: f64) -> Result<Self, ValidationError> {
        if !mean.is_finite() {
            return Err(ValidationError::NonFiniteTemperature(mean));
        }
        if !amplitude.is_finite() {
            return Err(ValidationError::NonFiniteTemperature(amplitude));
        }
        Ok(Self {
            mean,
            amplitude: amplitude.abs(),
            current: mean,
        })
    }

    #[must_use]
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Move to the next reading, rounded to a tenth of a degree.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        let max_step = self.amplitude * MAX_STEP_RATIO;
        if max_step > 0.0 {
            let next = self.current + rng.gen_range(-max_step..=max_step);
            let bounded = next.clamp(self.mean - self.amplitude, self.mean + self.amplitude);
            self.current = (bounded * 10.0).round() / 10.0;
        }
        self.current
    }
}

/// [`Simulation`] reporting outdoor temperatures to a [`SimulationContext`].
pub struct WeatherStation {
    settings: WeatherSettings,
    task: Option<JoinHandle<()>>,
}

impl WeatherStation {
    #[must_use]
    pub fn new(settings: WeatherSettings) -> Self {
        Self {
            settings,
            task: None,
        }
    }

    /// Whether the background task is currently running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Simulation for WeatherStation {
    fn name(&self) -> &'static str {
        "weather"
    }

    fn start(&mut self, ctx: impl SimulationContext + Clone + 'static) -> Result<(), HomeSimError> {
        let mut model = WeatherModel::new(self.settings.mean, self.settings.amplitude)?;
        let schedule = self.settings.schedule;

        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(schedule.next_delay()).await;
                let outdoor = model.step(&mut rand::thread_rng());
                match ctx.record_outdoor(outdoor).await {
                    Ok(room) => tracing::debug!(
                        outdoor,
                        room = room.temperature,
                        "weather reading"
                    ),
                    Err(err) => tracing::warn!(error = %err, outdoor, "weather reading rejected"),
                }
            }
        });

        if let Some(previous) = self.task.replace(task) {
            previous.abort();
        }
        tracing::info!(
            mean = self.settings.mean,
            amplitude = self.settings.amplitude,
            "weather station started"
        );
        Ok(())
    }

    async fn teardown(&mut self) -> Result<(), HomeSimError> {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("weather station stopped");
        }
        Ok(())
    }
}
