use super::postprocess::post_process::DEPTH_FORMAT;
use crate::gpu::pipeline_helpers::ADDITIVE_BLEND;
use crate::gpu::texture::HDR_FORMAT;
use crate::scene::BlendMode;

/// Blend state for a material blend mode.
pub fn blend_state(mode: BlendMode) -> wgpu::BlendState {
    match mode {
        BlendMode::Normal => wgpu::BlendState::ALPHA_BLENDING,
        BlendMode::Additive => ADDITIVE_BLEND,
    }
}

/// The single HDR scene color target every scene pipeline writes.
pub fn scene_color_target(
    blend: Option<BlendMode>,
) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format: HDR_FORMAT,
        blend: blend.map(blend_state),
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

/// Depth state for a material. Untested materials always pass.
pub fn depth_stencil_state(
    depth_test: bool,
    depth_write: bool,
) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: depth_write,
        depth_compare: if depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn additive_adds_onto_destination() {
        let state = blend_state(BlendMode::Additive);
        assert_eq!(state.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(state.color.operation, wgpu::BlendOperation::Add);
        assert_eq!(
            blend_state(BlendMode::Normal),
            wgpu::BlendState::ALPHA_BLENDING
        );
    }

    #[test]
    fn disabled_depth_test_always_passes() {
        let state = depth_stencil_state(false, false);
        assert_eq!(state.depth_compare, wgpu::CompareFunction::Always);
        assert!(!state.depth_write_enabled);
        assert_eq!(
            depth_stencil_state(true, true).depth_compare,
            wgpu::CompareFunction::Less
        );
    }
}
