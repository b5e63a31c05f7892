//! Binding ABI shared by the host pipeline setup and the WGSL program.
//!
//! Every slot number the shader uses is defined here once. The WGSL source
//! carries `{{NAME}}` placeholders that [`shader_source`] fills from these
//! enums, and [`check_shader`] reflects the compiled module to confirm it
//! declares exactly the expected bindings before a pipeline is linked.

use bytemuck::{Pod, Zeroable};

use super::PresentError;

/// Vertex-stage input slots.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexInput {
    /// Per-vertex geometry buffer (`set_vertex_buffer` slot).
    Vertices = 0,
    /// Drawable-size uniform (binding in [`VERTEX_STAGE_GROUP`]).
    ViewportSize = 1,
}

impl VertexInput {
    pub const ALL: [VertexInput; 2] = [VertexInput::Vertices, VertexInput::ViewportSize];

    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

/// Fragment-stage texture slots.
#[repr(u32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureIndex {
    /// Framebuffer contents to sample.
    BaseColor = 0,
}

impl TextureIndex {
    pub const ALL: [TextureIndex; 1] = [TextureIndex::BaseColor];

    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Binding of the sampler paired with this texture.
    ///
    /// Samplers are numbered after all textures of the group.
    #[inline]
    pub const fn sampler_index(self) -> u32 {
        TextureIndex::ALL.len() as u32 + self as u32
    }
}

/// Bind group holding vertex-stage uniforms.
pub const VERTEX_STAGE_GROUP: u32 = 0;
/// Bind group holding fragment-stage textures and samplers.
pub const FRAGMENT_STAGE_GROUP: u32 = 1;

// ── vertex record ─────────────────────────────────────────────────────────

/// One vertex of the display quad.
///
/// Layout (16 bytes, no padding):
///
///  offset 0  position            [f32; 2]   loc 0
///  offset 8  texture_coordinate  [f32; 2]   loc 1
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ScreenVertex {
    /// Pixel space, origin at the centre, +Y up.
    pub position: [f32; 2],
    /// Normalized sampling coordinate, (0, 0) = top-left texel.
    pub texture_coordinate: [f32; 2],
}

impl ScreenVertex {
    pub const POSITION_LOCATION: u32 = 0;
    pub const TEXTURE_COORDINATE_LOCATION: u32 = 1;

    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x2  // texture_coordinate
    ];

    pub const fn new(position: [f32; 2], texture_coordinate: [f32; 2]) -> Self {
        Self { position, texture_coordinate }
    }

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ScreenVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const _: () = assert!(std::mem::size_of::<ScreenVertex>() == 16);
const _: () = assert!(std::mem::offset_of!(ScreenVertex, texture_coordinate) == 8);
// The pipeline declares a single vertex buffer, which must sit in slot 0.
const _: () = assert!(VertexInput::Vertices.index() == 0);

// ── viewport uniform ──────────────────────────────────────────────────────

/// Uniform bound at [`VertexInput::ViewportSize`].
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewportUniform {
    /// Drawable size in physical pixels.
    pub size: [f32; 2],
    /// Native-to-surface scale per axis.
    pub scale: [f32; 2],
}

const _: () = assert!(std::mem::size_of::<ViewportUniform>() == 16);

/// Minimum binding size for the viewport uniform buffer.
pub(crate) fn viewport_min_binding_size() -> wgpu::BufferSize {
    const SIZE: wgpu::BufferSize = match wgpu::BufferSize::new(
        std::mem::size_of::<ViewportUniform>() as u64,
    ) {
        Some(size) => size,
        None => panic!("ViewportUniform is zero-sized"),
    };
    SIZE
}

// ── shader source ─────────────────────────────────────────────────────────

const SHADER_TEMPLATE: &str = include_str!("shaders/present.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Returns the WGSL program with every slot placeholder filled in.
pub fn shader_source() -> String {
    let substitutions = [
        ("{{POSITION_LOCATION}}", ScreenVertex::POSITION_LOCATION),
        (
            "{{TEXTURE_COORDINATE_LOCATION}}",
            ScreenVertex::TEXTURE_COORDINATE_LOCATION,
        ),
        ("{{VERTEX_GROUP}}", VERTEX_STAGE_GROUP),
        ("{{FRAGMENT_GROUP}}", FRAGMENT_STAGE_GROUP),
        ("{{VIEWPORT_SIZE}}", VertexInput::ViewportSize.index()),
        ("{{BASE_COLOR}}", TextureIndex::BaseColor.index()),
        ("{{BASE_COLOR_SAMPLER}}", TextureIndex::BaseColor.sampler_index()),
    ];

    substitutions
        .iter()
        .fold(SHADER_TEMPLATE.to_owned(), |src, (name, value)| {
            src.replace(name, &value.to_string())
        })
}

/// `(group, binding)` pairs the program must declare, sorted.
pub fn expected_resource_bindings() -> Vec<(u32, u32)> {
    let mut bindings = Vec::new();

    for input in VertexInput::ALL {
        // The vertex buffer is a pipeline slot, not a bind-group resource.
        if input != VertexInput::Vertices {
            bindings.push((VERTEX_STAGE_GROUP, input.index()));
        }
    }
    for texture in TextureIndex::ALL {
        bindings.push((FRAGMENT_STAGE_GROUP, texture.index()));
        bindings.push((FRAGMENT_STAGE_GROUP, texture.sampler_index()));
    }

    bindings.sort_unstable();
    bindings
}

/// Compiles `source` with naga and checks it against this module's ABI.
///
/// Fails with [`PresentError::PipelineCreation`] when the program does not
/// parse or validate, lacks an entry point, or declares bindings or vertex
/// locations that differ from the enums above.
pub fn check_shader(source: &str) -> Result<(), PresentError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| PresentError::pipeline(format!("WGSL parse: {}", e.emit_to_string(source))))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| PresentError::pipeline(format!("WGSL validation: {e:?}")))?;

    let mut declared: Vec<(u32, u32)> = module
        .global_variables
        .iter()
        .filter_map(|(_, var)| var.binding.as_ref().map(|b| (b.group, b.binding)))
        .collect();
    declared.sort_unstable();

    let expected = expected_resource_bindings();
    if declared != expected {
        return Err(PresentError::pipeline(format!(
            "shader declares bindings {declared:?}, host expects {expected:?}"
        )));
    }

    let vertex = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == naga::ShaderStage::Vertex && ep.name == VERTEX_ENTRY)
        .ok_or_else(|| PresentError::pipeline(format!("missing vertex entry `{VERTEX_ENTRY}`")))?;

    if !module
        .entry_points
        .iter()
        .any(|ep| ep.stage == naga::ShaderStage::Fragment && ep.name == FRAGMENT_ENTRY)
    {
        return Err(PresentError::pipeline(format!(
            "missing fragment entry `{FRAGMENT_ENTRY}`"
        )));
    }

    let mut locations = Vec::new();
    for arg in &vertex.function.arguments {
        match (&arg.binding, &module.types[arg.ty].inner) {
            (Some(naga::Binding::Location { location, .. }), _) => locations.push(*location),
            (None, naga::TypeInner::Struct { members, .. }) => {
                locations.extend(members.iter().filter_map(|m| match m.binding {
                    Some(naga::Binding::Location { location, .. }) => Some(location),
                    _ => None,
                }));
            }
            _ => {}
        }
    }
    locations.sort_unstable();

    let expected_locations = [
        ScreenVertex::POSITION_LOCATION,
        ScreenVertex::TEXTURE_COORDINATE_LOCATION,
    ];
    if locations != expected_locations {
        return Err(PresentError::pipeline(format!(
            "vertex stage reads locations {locations:?}, vertex layout provides {expected_locations:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_values_are_stable() {
        assert_eq!(VertexInput::Vertices.index(), 0);
        assert_eq!(VertexInput::ViewportSize.index(), 1);
        assert_eq!(TextureIndex::BaseColor.index(), 0);
        assert_eq!(TextureIndex::BaseColor.sampler_index(), 1);
    }

    #[test]
    fn slots_are_contiguous() {
        for (i, input) in VertexInput::ALL.iter().enumerate() {
            assert_eq!(input.index(), i as u32);
        }
        for (i, tex) in TextureIndex::ALL.iter().enumerate() {
            assert_eq!(tex.index(), i as u32);
        }
    }

    #[test]
    fn vertex_layout_matches_record() {
        let layout = ScreenVertex::layout();
        assert_eq!(layout.array_stride, 16);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].shader_location, ScreenVertex::POSITION_LOCATION);
        assert_eq!(layout.attributes[1].offset, 8);
        assert_eq!(
            layout.attributes[1].shader_location,
            ScreenVertex::TEXTURE_COORDINATE_LOCATION
        );
    }

    #[test]
    fn generated_source_has_no_placeholders() {
        let src = shader_source();
        assert!(!src.contains("{{"), "unfilled placeholder in:\n{src}");
    }

    #[test]
    fn generated_source_matches_abi() {
        check_shader(&shader_source()).unwrap();
    }

    #[test]
    fn binding_drift_is_rejected() {
        let drifted = shader_source().replace(
            &format!("@binding({})\nvar<uniform>", VertexInput::ViewportSize.index()),
            "@binding(5)\nvar<uniform>",
        );
        assert_ne!(drifted, shader_source(), "substitution did not apply");

        match check_shader(&drifted) {
            Err(PresentError::PipelineCreation(msg)) => assert!(msg.contains("bindings")),
            other => panic!("expected PipelineCreation, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_source_is_rejected() {
        let err = check_shader("fn vs_main( {").unwrap_err();
        assert!(matches!(err, PresentError::PipelineCreation(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let renamed = shader_source().replace("fn fs_main", "fn fragment_main");
        let err = check_shader(&renamed).unwrap_err();
        assert!(err.to_string().contains(FRAGMENT_ENTRY));
    }
}
