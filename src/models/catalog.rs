//! Built-in benchmark catalog.

use super::{ModelEntry, ModelFamily, Precision};

/// Images per classification dataset.
const IMAGE_DATASET_SIZE: usize = 400;

/// Utterances per speech dataset.
const SPEECH_DATASET_SIZE: usize = 60;

fn speech(name: &str, family: ModelFamily, seed: u64) -> ModelEntry {
    ModelEntry {
        name: name.to_string(),
        family,
        width_multiplier: 1.0,
        resolution: None,
        precision: Precision::Float32,
        seed,
        dataset_size: SPEECH_DATASET_SIZE,
    }
}

fn mobilenet(
    family: ModelFamily,
    width_multiplier: f32,
    resolution: usize,
    precision: Precision,
    seed: u64,
) -> ModelEntry {
    let version = match family {
        ModelFamily::MobilenetV2 => "v2",
        _ => "v1",
    };
    let quant = match precision {
        Precision::Quant8 => "_quant",
        Precision::Float32 => "",
    };
    ModelEntry {
        // Debug formatting keeps the trailing ".0" of whole multipliers.
        name: format!(
            "mobilenet_{}_{:?}_{}{}_topk_aosp",
            version, width_multiplier, resolution, quant
        ),
        family,
        width_multiplier,
        resolution: Some(resolution),
        precision,
        seed,
        dataset_size: IMAGE_DATASET_SIZE,
    }
}

/// Every model known to the registry. Float and quantized variants of the same
/// architecture share a seed.
pub fn builtin_entries() -> Vec<ModelEntry> {
    use ModelFamily::{Asr, MobilenetV1, MobilenetV2, Tts};
    use Precision::{Float32, Quant8};

    vec![
        speech("tts_float", Tts, 101),
        speech("asr_float", Asr, 102),
        mobilenet(MobilenetV1, 1.0, 224, Quant8, 110),
        mobilenet(MobilenetV1, 1.0, 224, Float32, 110),
        mobilenet(MobilenetV1, 0.75, 192, Quant8, 111),
        mobilenet(MobilenetV1, 0.75, 192, Float32, 111),
        mobilenet(MobilenetV1, 0.5, 160, Quant8, 112),
        mobilenet(MobilenetV1, 0.5, 160, Float32, 112),
        mobilenet(MobilenetV1, 0.25, 128, Quant8, 113),
        mobilenet(MobilenetV1, 0.25, 128, Float32, 113),
        mobilenet(MobilenetV2, 0.35, 128, Float32, 120),
        mobilenet(MobilenetV2, 0.5, 160, Float32, 121),
        mobilenet(MobilenetV2, 0.75, 192, Float32, 122),
        mobilenet(MobilenetV2, 1.0, 224, Float32, 123),
        mobilenet(MobilenetV2, 1.0, 224, Quant8, 123),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_names_follow_catalog_convention() {
        let names: Vec<String> = builtin_entries().into_iter().map(|e| e.name).collect();
        assert!(names.contains(&"mobilenet_v1_1.0_224_quant_topk_aosp".to_string()));
        assert!(names.contains(&"mobilenet_v1_0.75_192_topk_aosp".to_string()));
        assert!(names.contains(&"mobilenet_v1_0.5_160_quant_topk_aosp".to_string()));
        assert!(names.contains(&"mobilenet_v1_0.25_128_topk_aosp".to_string()));
        assert!(names.contains(&"mobilenet_v2_0.35_128_topk_aosp".to_string()));
        assert!(names.contains(&"mobilenet_v2_1.0_224_quant_topk_aosp".to_string()));
    }
}
