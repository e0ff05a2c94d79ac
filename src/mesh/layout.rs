/// The highest texture unit a [`Layout`] can describe coordinates for.
pub const MAX_TEXTURE_UNIT: usize = 3;

const ATTR_TOTAL: usize = 5 + 2*(MAX_TEXTURE_UNIT + 1);
const TEX_COORDS_2D_0: usize = 5;
const TEX_COORDS_3D_0: usize = TEX_COORDS_2D_0 + MAX_TEXTURE_UNIT + 1;

/// The builtin attributes a [`Layout`] tracks. Texture coordinates carry the texture unit they
/// belong to, which may not be larger than [`MAX_TEXTURE_UNIT`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    Indices,
    Positions,
    Normals,
    ColorsRgb,
    ColorsRgba,
    TexCoords2d(usize),
    TexCoords3d(usize),
}

impl Attribute {
    /// The number of primitives one vertex stores for this attribute.
    pub fn components(self) -> usize {
        match self {
            Attribute::Indices => 1,
            Attribute::Positions | Attribute::Normals | Attribute::ColorsRgb => 3,
            Attribute::ColorsRgba => 4,
            Attribute::TexCoords2d(_) => 2,
            Attribute::TexCoords3d(_) => 3,
        }
    }

    /// The number of bytes one vertex stores for this attribute. All attributes are stored as
    /// `GLfloat`s, except for indices which are `GLuint`s. Both are four bytes.
    pub fn bytes(self) -> usize {
        self.components() * 4
    }

    fn slot(self) -> usize {
        match self {
            Attribute::Indices    => 0,
            Attribute::Positions  => 1,
            Attribute::Normals    => 2,
            Attribute::ColorsRgb  => 3,
            Attribute::ColorsRgba => 4,
            Attribute::TexCoords2d(unit) => TEX_COORDS_2D_0 + check_unit(unit),
            Attribute::TexCoords3d(unit) => TEX_COORDS_3D_0 + check_unit(unit),
        }
    }

    /// The attribute that can not be set at the same time as this one.
    fn exclusive_with(self) -> Option<Attribute> {
        match self {
            Attribute::ColorsRgb => Some(Attribute::ColorsRgba),
            Attribute::ColorsRgba => Some(Attribute::ColorsRgb),
            Attribute::TexCoords2d(unit) => Some(Attribute::TexCoords3d(unit)),
            Attribute::TexCoords3d(unit) => Some(Attribute::TexCoords2d(unit)),
            _ => None,
        }
    }
}

fn check_unit(unit: usize) -> usize {
    assert!(unit <= MAX_TEXTURE_UNIT,
            "Texture unit {} is out of range, at most {} units are supported",
            unit, MAX_TEXTURE_UNIT + 1);
    unit
}

/// Where the data for a attribute is stored, if at all.
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttribState {
    /// The attribute is not part of the mesh
    Unset,
    /// The data is uploaded once and read often
    Static,
    /// The data is interleaved in a buffer that is streamed to often
    Dynamic,
}

impl Default for AttribState {
    fn default() -> AttribState { AttribState::Unset }
}

/// A user defined floating point vertex attribute.
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CustomAttr {
    Float,
    Float2,
    Float3,
    Float4,
}

impl CustomAttr {
    /// The number of bytes one vertex stores for this attribute.
    pub fn bytes(self) -> usize {
        self.components() * 4
    }

    /// The number of floats per vertex.
    pub fn components(self) -> usize {
        match self {
            CustomAttr::Float  => 1,
            CustomAttr::Float2 => 2,
            CustomAttr::Float3 => 3,
            CustomAttr::Float4 => 4,
        }
    }
}

/// Describes which vertex data a [`VboMesh`](struct.VboMesh.html) stores, and whether each
/// piece of data is static or dynamic.
///
/// RGB and RGBA colors exclude each other, as do 2d and 3d texture coordinates on the same
/// texture unit. Setting one clears the other.
///
/// Custom attributes are stored as a list of `(type, offset)` pairs, one list for static and one
/// for dynamic data. The offsets are zero until a mesh computes its buffer layout.
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Layout {
    attributes: [AttribState; ATTR_TOTAL],
    pub(crate) custom_static: Vec<(CustomAttr, usize)>,
    pub(crate) custom_dynamic: Vec<(CustomAttr, usize)>,
}

macro_rules! attribute_accessors {
    ($attr:expr, $has:ident, $has_static:ident, $has_dynamic:ident, $set_static:ident, $set_dynamic:ident) => {
        pub fn $has(&self) -> bool { self.has($attr) }
        pub fn $has_static(&self) -> bool { self.state($attr) == AttribState::Static }
        pub fn $has_dynamic(&self) -> bool { self.state($attr) == AttribState::Dynamic }
        pub fn $set_static(&mut self) { self.set($attr, AttribState::Static) }
        pub fn $set_dynamic(&mut self) { self.set($attr, AttribState::Dynamic) }
    }
}

impl Layout {
    /// Creates a layout with no attributes set.
    pub fn new() -> Layout {
        Layout::default()
    }

    /// Returns true if no builtin attribute has been set. A mesh constructed from a
    /// [`TriMesh`](struct.TriMesh.html) infers its layout if given a default layout.
    pub fn is_defaults(&self) -> bool {
        self.attributes.iter().all(|state| *state == AttribState::Unset)
    }

    pub fn state(&self, attr: Attribute) -> AttribState {
        self.attributes[attr.slot()]
    }

    /// Sets the state of the given attribute. Setting RGB colors clears RGBA colors and
    /// setting 2d texture coordinates clears 3d texture coordinates on the same unit, and
    /// vice versa.
    pub fn set(&mut self, attr: Attribute, state: AttribState) {
        self.attributes[attr.slot()] = state;

        if state != AttribState::Unset {
            if let Some(other) = attr.exclusive_with() {
                self.attributes[other.slot()] = AttribState::Unset;
            }
        }
    }

    pub fn has(&self, attr: Attribute) -> bool {
        self.state(attr) != AttribState::Unset
    }

    attribute_accessors!(Attribute::Indices, has_indices, has_static_indices, has_dynamic_indices,
                         set_static_indices, set_dynamic_indices);
    attribute_accessors!(Attribute::Positions, has_positions, has_static_positions, has_dynamic_positions,
                         set_static_positions, set_dynamic_positions);
    attribute_accessors!(Attribute::Normals, has_normals, has_static_normals, has_dynamic_normals,
                         set_static_normals, set_dynamic_normals);
    attribute_accessors!(Attribute::ColorsRgb, has_colors_rgb, has_static_colors_rgb, has_dynamic_colors_rgb,
                         set_static_colors_rgb, set_dynamic_colors_rgb);
    attribute_accessors!(Attribute::ColorsRgba, has_colors_rgba, has_static_colors_rgba, has_dynamic_colors_rgba,
                         set_static_colors_rgba, set_dynamic_colors_rgba);

    pub fn has_tex_coords_2d(&self, unit: usize) -> bool {
        self.has(Attribute::TexCoords2d(unit))
    }
    pub fn has_static_tex_coords_2d(&self, unit: usize) -> bool {
        self.state(Attribute::TexCoords2d(unit)) == AttribState::Static
    }
    pub fn has_dynamic_tex_coords_2d(&self, unit: usize) -> bool {
        self.state(Attribute::TexCoords2d(unit)) == AttribState::Dynamic
    }
    pub fn set_static_tex_coords_2d(&mut self, unit: usize) {
        self.set(Attribute::TexCoords2d(unit), AttribState::Static);
    }
    pub fn set_dynamic_tex_coords_2d(&mut self, unit: usize) {
        self.set(Attribute::TexCoords2d(unit), AttribState::Dynamic);
    }

    pub fn has_tex_coords_3d(&self, unit: usize) -> bool {
        self.has(Attribute::TexCoords3d(unit))
    }
    pub fn has_static_tex_coords_3d(&self, unit: usize) -> bool {
        self.state(Attribute::TexCoords3d(unit)) == AttribState::Static
    }
    pub fn has_dynamic_tex_coords_3d(&self, unit: usize) -> bool {
        self.state(Attribute::TexCoords3d(unit)) == AttribState::Dynamic
    }
    pub fn set_static_tex_coords_3d(&mut self, unit: usize) {
        self.set(Attribute::TexCoords3d(unit), AttribState::Static);
    }
    pub fn set_dynamic_tex_coords_3d(&mut self, unit: usize) {
        self.set(Attribute::TexCoords3d(unit), AttribState::Dynamic);
    }

    /// Returns true if either 2d or 3d texture coordinates are set for the given unit.
    pub fn has_tex_coords(&self, unit: usize) -> bool {
        self.has_tex_coords_2d(unit) || self.has_tex_coords_3d(unit)
    }

    /// Returns true if any texture unit has static texture coordinates.
    pub fn has_static_tex_coords(&self) -> bool {
        (0..=MAX_TEXTURE_UNIT).any(|unit| {
            self.has_static_tex_coords_2d(unit) || self.has_static_tex_coords_3d(unit)
        })
    }

    /// Returns true if any texture unit has dynamic texture coordinates.
    pub fn has_dynamic_tex_coords(&self) -> bool {
        (0..=MAX_TEXTURE_UNIT).any(|unit| {
            self.has_dynamic_tex_coords_2d(unit) || self.has_dynamic_tex_coords_3d(unit)
        })
    }

    /// The texture coordinate attribute set for the given unit, if any.
    pub fn tex_coords(&self, unit: usize) -> Option<Attribute> {
        if self.has_tex_coords_2d(unit) {
            Some(Attribute::TexCoords2d(unit))
        } else if self.has_tex_coords_3d(unit) {
            Some(Attribute::TexCoords3d(unit))
        } else {
            None
        }
    }

    pub fn add_static_custom(&mut self, attr: CustomAttr) {
        self.custom_static.push((attr, 0));
    }
    pub fn add_dynamic_custom(&mut self, attr: CustomAttr) {
        self.custom_dynamic.push((attr, 0));
    }

    pub fn add_dynamic_custom_float(&mut self) { self.add_dynamic_custom(CustomAttr::Float) }
    pub fn add_dynamic_custom_vec2(&mut self)  { self.add_dynamic_custom(CustomAttr::Float2) }
    pub fn add_dynamic_custom_vec3(&mut self)  { self.add_dynamic_custom(CustomAttr::Float3) }
    pub fn add_dynamic_custom_vec4(&mut self)  { self.add_dynamic_custom(CustomAttr::Float4) }

    pub fn add_static_custom_float(&mut self) { self.add_static_custom(CustomAttr::Float) }
    pub fn add_static_custom_vec2(&mut self)  { self.add_static_custom(CustomAttr::Float2) }
    pub fn add_static_custom_vec3(&mut self)  { self.add_static_custom(CustomAttr::Float3) }
    pub fn add_static_custom_vec4(&mut self)  { self.add_static_custom(CustomAttr::Float4) }

    /// Static custom attributes as `(type, byte offset)` pairs, in insertion order.
    pub fn custom_static(&self) -> &[(CustomAttr, usize)] {
        &self.custom_static
    }

    /// Dynamic custom attributes as `(type, byte offset)` pairs, in insertion order.
    pub fn custom_dynamic(&self) -> &[(CustomAttr, usize)] {
        &self.custom_dynamic
    }

    /// The builtin non-index attributes with the given state, in the order they are laid out
    /// in a vertex.
    pub fn vertex_attributes(&self, state: AttribState) -> Vec<Attribute> {
        let mut result = Vec::new();
        let fixed = [Attribute::Positions, Attribute::Normals, Attribute::ColorsRgb, Attribute::ColorsRgba];
        for attr in fixed.iter() {
            if self.state(*attr) == state {
                result.push(*attr);
            }
        }
        for unit in 0..=MAX_TEXTURE_UNIT {
            if let Some(attr) = self.tex_coords(unit) {
                if self.state(attr) == state {
                    result.push(attr);
                }
            }
        }
        result
    }

    /// Returns true if a mesh with this layout needs a buffer for static vertex data.
    pub fn needs_static_buffer(&self) -> bool {
        !self.vertex_attributes(AttribState::Static).is_empty() || !self.custom_static.is_empty()
    }

    /// Returns true if a mesh with this layout needs a buffer for dynamic vertex data.
    pub fn needs_dynamic_buffer(&self) -> bool {
        !self.vertex_attributes(AttribState::Dynamic).is_empty() || !self.custom_dynamic.is_empty()
    }
}
