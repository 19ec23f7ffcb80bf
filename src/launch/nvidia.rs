use super::script::ScriptHeader;

/// Images known to need `nvidia-docker`. Entries with a tag only match that tag.
const BUILTIN_IMAGES: &[&str] = &[
    // NVIDIA images
    "nvidia/cuda",
    "nvidia/caffe",
    "nvidia/digits",
    // Third-party images
    "bvlc/caffe:gpu",
    "dmlc/mxnet:cuda",
    "kaixhin/cuda-theano",
    "microsoft/cntk:latest",
    "tensorflow/tensorflow:latest-gpu",
];

#[derive(Debug, Clone)]
pub struct NvidiaImages {
    images: Vec<String>,
}

impl NvidiaImages {
    pub fn builtin() -> Self {
        Self {
            images: BUILTIN_IMAGES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// The built-in list extended with `extra`.
    pub fn new(extra: impl IntoIterator<Item = String>) -> Self {
        let mut images = Self::builtin();
        images.images.extend(extra);
        images
    }

    pub fn requires_nvidia(&self, header: &ScriptHeader) -> bool {
        let without_tag = header.image_without_tag();
        self.images
            .iter()
            .any(|image| image == without_tag || *image == header.image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(image: &str) -> ScriptHeader {
        ScriptHeader {
            image: image.to_string(),
            interpreter: "bash".to_string(),
        }
    }

    #[test]
    fn test_untagged_entry_matches_any_tag() {
        let images = NvidiaImages::builtin();
        assert!(images.requires_nvidia(&header("nvidia/cuda")));
        assert!(images.requires_nvidia(&header("nvidia/cuda:9.0-devel")));
    }

    #[test]
    fn test_tagged_entry_matches_only_that_tag() {
        let images = NvidiaImages::builtin();
        assert!(images.requires_nvidia(&header("tensorflow/tensorflow:latest-gpu")));
        assert!(!images.requires_nvidia(&header("tensorflow/tensorflow:latest")));
        assert!(!images.requires_nvidia(&header("tensorflow/tensorflow")));
    }

    #[test]
    fn test_plain_images_do_not_match() {
        let images = NvidiaImages::builtin();
        assert!(!images.requires_nvidia(&header("python:latest")));
        assert!(!images.requires_nvidia(&header("nvidia/cudagl")));
    }

    #[test]
    fn test_extra_images_from_config() {
        let images = NvidiaImages::new(["lab/trainer".to_string()]);
        assert!(images.requires_nvidia(&header("lab/trainer:v2")));
        assert!(images.requires_nvidia(&header("nvidia/digits")));
    }
}
