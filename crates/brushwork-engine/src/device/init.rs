use anyhow::Result;

/// Initialization parameters for the headless GPU layer.
///
/// Keep this structure stable and minimal. Add configuration flags only when a
/// concrete platform or backend requirement exists.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Offscreen color target size in pixels.
    pub width: u32,
    pub height: u32,

    /// Color target format. Must be a renderable color format.
    pub color_format: wgpu::TextureFormat,

    pub power_preference: wgpu::PowerPreference,

    /// Accept a software adapter when no hardware adapter is available.
    pub force_fallback_adapter: bool,

    /// Required wgpu features.
    ///
    /// Favor an empty set for portability unless a feature is strictly necessary.
    pub required_features: wgpu::Features,

    /// Limits requested from the adapter/device.
    pub required_limits: wgpu::Limits,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            color_format: wgpu::TextureFormat::Rgba8UnormSrgb,
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
        }
    }
}

impl GpuInit {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.width > 0 && self.height > 0,
            "offscreen target has zero size ({}x{})",
            self.width,
            self.height
        );
        anyhow::ensure!(
            !self.color_format.is_depth_stencil_format(),
            "color format {:?} is a depth/stencil format",
            self.color_format
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(GpuInit::default().validate().is_ok());
    }

    #[test]
    fn zero_size_is_rejected() {
        let init = GpuInit { width: 0, ..GpuInit::default() };
        let err = init.validate().unwrap_err();
        assert!(err.to_string().contains("zero size"));
    }

    #[test]
    fn depth_color_format_is_rejected() {
        let init = GpuInit {
            color_format: wgpu::TextureFormat::Depth32Float,
            ..GpuInit::default()
        };
        assert!(init.validate().is_err());
    }
}
