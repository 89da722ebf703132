//! Pipeline behaviour against in-memory trainers

use anyhow::Result;
use ndarray::{Array2, ArrayD, ArrayViewD, Axis};
use radiomics_autoencoder::{
    AutoencoderError, AutoencoderTrainer, FeatureExtractionPipeline, ModelKind, TrainingConfig,
    TrainingReport,
};
use radiomics_preprocess::{ImageSettings, IndexDim, Normalization, ProcessingError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Identity autoencoder whose latent code is the per-sample mean
struct MeanTrainer {
    kind: ModelKind,
    sample_axis: usize,
    fitted_shapes: Vec<Vec<usize>>,
}

impl MeanTrainer {
    fn new(kind: ModelKind, sample_axis: usize) -> Self {
        Self {
            kind,
            sample_axis,
            fitted_shapes: Vec::new(),
        }
    }
}

impl AutoencoderTrainer for MeanTrainer {
    fn kind(&self) -> ModelKind {
        self.kind
    }

    fn fit(
        &mut self,
        tensor: ArrayViewD<'_, f32>,
        config: &TrainingConfig,
    ) -> radiomics_autoencoder::Result<TrainingReport> {
        self.fitted_shapes.push(tensor.shape().to_vec());
        Ok(TrainingReport {
            epochs_run: config.epochs,
            final_loss: 0.0,
            validation_loss: None,
        })
    }

    fn predict(&self, tensor: ArrayViewD<'_, f32>) -> radiomics_autoencoder::Result<ArrayD<f32>> {
        Ok(tensor.to_owned())
    }

    fn encode(&self, tensor: ArrayViewD<'_, f32>) -> radiomics_autoencoder::Result<Array2<f32>> {
        let means: Vec<f32> = tensor
            .axis_iter(Axis(self.sample_axis))
            .map(|sample| sample.mean().unwrap_or(0.0))
            .collect();
        Ok(Array2::from_shape_vec((means.len(), 1), means).map_err(ProcessingError::from)?)
    }
}

/// Trainer that breaks the output contracts
struct BrokenTrainer;

impl AutoencoderTrainer for BrokenTrainer {
    fn kind(&self) -> ModelKind {
        ModelKind::Vanilla
    }

    fn fit(
        &mut self,
        _tensor: ArrayViewD<'_, f32>,
        _config: &TrainingConfig,
    ) -> radiomics_autoencoder::Result<TrainingReport> {
        Err(AutoencoderError::trainer("loss is NaN"))
    }

    fn predict(&self, tensor: ArrayViewD<'_, f32>) -> radiomics_autoencoder::Result<ArrayD<f32>> {
        let mut shape = tensor.shape().to_vec();
        shape[0] += 1;
        Ok(ArrayD::zeros(shape))
    }

    fn encode(&self, _tensor: ArrayViewD<'_, f32>) -> radiomics_autoencoder::Result<Array2<f32>> {
        Ok(Array2::zeros((1, 4)))
    }
}

fn settings(index_dim: IndexDim) -> ImageSettings {
    ImageSettings::builder()
        .width(6)
        .height(6)
        .normalization(Normalization::MinMax)
        .min_limit(0.0)
        .max_limit(100.0)
        .index_dim(index_dim)
        .build()
        .unwrap()
}

fn raw_images() -> Vec<Array2<f32>> {
    vec![
        Array2::from_elem((12, 12), 25.0),
        Array2::from_elem((9, 10), 50.0),
        Array2::from_elem((6, 6), 150.0),
    ]
}

#[test]
fn test_train_feeds_melted_tensor() -> Result<()> {
    init_tracing();
    let mut pipeline = FeatureExtractionPipeline::new(
        settings(IndexDim::First),
        MeanTrainer::new(ModelKind::Vanilla, 0),
    )?;

    let config = TrainingConfig {
        epochs: 3,
        ..TrainingConfig::default()
    };
    let report = pipeline.train(&raw_images(), &config)?;

    assert_eq!(report.epochs_run, 3);
    assert_eq!(pipeline.trainer().fitted_shapes, vec![vec![3, 36]]);
    Ok(())
}

#[test]
fn test_convolutional_layout_with_last_index() -> Result<()> {
    let pipeline = FeatureExtractionPipeline::new(
        settings(IndexDim::Last),
        MeanTrainer::new(ModelKind::Convolutional, 2),
    )?;

    let tensor = pipeline.prepare(&raw_images())?;
    assert_eq!(tensor.shape(), &[6, 6, 3, 1]);
    Ok(())
}

#[test]
fn test_invalid_training_config_skips_trainer() -> Result<()> {
    let mut pipeline = FeatureExtractionPipeline::new(
        settings(IndexDim::First),
        MeanTrainer::new(ModelKind::Vanilla, 0),
    )?;

    let config = TrainingConfig {
        batch_size: 0,
        ..TrainingConfig::default()
    };
    let err = pipeline.train(&raw_images(), &config).unwrap_err();

    assert!(matches!(err, AutoencoderError::InvalidConfig(_)));
    assert!(pipeline.trainer().fitted_shapes.is_empty());
    Ok(())
}

#[test]
fn test_extract_features_one_row_per_image() -> Result<()> {
    for (index_dim, kind, sample_axis) in [
        (IndexDim::First, ModelKind::Vanilla, 0),
        (IndexDim::Last, ModelKind::Vanilla, 1),
        (IndexDim::First, ModelKind::Convolutional, 0),
        (IndexDim::Last, ModelKind::Convolutional, 2),
    ] {
        let pipeline = FeatureExtractionPipeline::new(
            settings(index_dim),
            MeanTrainer::new(kind, sample_axis),
        )?;

        let features = pipeline.extract_features(&raw_images())?;
        assert_eq!(features.dim(), (3, 1));
        for (got, want) in features.column(0).iter().zip([0.25f32, 0.5, 1.0]) {
            assert!((got - want).abs() < 1e-4, "{kind}/{index_dim:?}: {got} vs {want}");
        }
    }
    Ok(())
}

#[test]
fn test_reconstruct_returns_original_scale() -> Result<()> {
    init_tracing();
    for kind in [ModelKind::Vanilla, ModelKind::Convolutional] {
        for index_dim in [IndexDim::First, IndexDim::Last] {
            let pipeline =
                FeatureExtractionPipeline::new(settings(index_dim), MeanTrainer::new(kind, 0))?;

            let restored = pipeline.reconstruct(&raw_images())?;
            assert_eq!(restored.len(), 3);
            // 150 is clipped to the max limit before normalization
            for (image, value) in restored.iter().zip([25.0f32, 50.0, 100.0]) {
                assert_eq!(image.dim(), (6, 6));
                assert!(
                    image.iter().all(|v| (v - value).abs() < 1e-3),
                    "{kind}/{index_dim:?}: expected {value}"
                );
            }
        }
    }
    Ok(())
}

#[test]
fn test_trainer_failure_propagates() {
    let mut pipeline =
        FeatureExtractionPipeline::new(settings(IndexDim::First), BrokenTrainer).unwrap();

    let err = pipeline
        .train(&raw_images(), &TrainingConfig::default())
        .unwrap_err();
    assert!(matches!(err, AutoencoderError::Trainer(_)));
}

#[test]
fn test_prediction_shape_is_checked() {
    let pipeline =
        FeatureExtractionPipeline::new(settings(IndexDim::First), BrokenTrainer).unwrap();

    let err = pipeline.reconstruct(&raw_images()).unwrap_err();
    match err {
        AutoencoderError::OutputShape { actual, .. } => assert_eq!(actual, vec![4, 36]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_feature_row_count_is_checked() {
    let pipeline =
        FeatureExtractionPipeline::new(settings(IndexDim::First), BrokenTrainer).unwrap();

    let err = pipeline.extract_features(&raw_images()).unwrap_err();
    assert!(matches!(err, AutoencoderError::OutputShape { .. }));
}

#[test]
fn test_pipeline_requires_index_dim() {
    let settings = ImageSettings::builder().width(6).height(6).build().unwrap();
    let err = FeatureExtractionPipeline::new(settings, BrokenTrainer)
        .err()
        .expect("index_dim is required");

    let collapsed: ProcessingError = err.into();
    assert!(collapsed.is_config_error());
}

#[test]
fn test_boxed_trainer() -> Result<()> {
    let trainer: Box<dyn AutoencoderTrainer> =
        Box::new(MeanTrainer::new(ModelKind::Convolutional, 0));
    let pipeline = FeatureExtractionPipeline::new(settings(IndexDim::First), trainer)?;

    assert_eq!(pipeline.prepare(&raw_images())?.shape(), &[3, 6, 6, 1]);
    Ok(())
}
