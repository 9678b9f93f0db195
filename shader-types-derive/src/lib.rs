//! Derive macro for shader-types record layouts.
//!
//! `#[derive(GpuRecord)]` turns a host-side struct written with semantic
//! types (glam vectors, `bool` flags, plain scalars) into a byte-exact
//! record that can be shared with Metal or WGSL code. It generates:
//!
//! - A companion `{Name}Gpu` struct, `#[repr(C)]` and `bytemuck::Pod`, with
//!   every padding slot spelled out as a `_padN` field
//! - A `WGSL_STRUCT` constant declaring the same struct for shaders
//! - A `FIELDS` table of field names, byte offsets and kinds
//! - `to_gpu()` / `from_gpu()` conversions
//!
//! The macro is re-exported from the main `shader_types` crate:
//!
//! ```ignore
//! use shader_types::prelude::*;
//!
//! #[derive(GpuRecord, Clone, Copy)]
//! struct Cube {
//!     color: Vec4,
//!     center: Vec3,
//!     alive: bool,
//!     size: f32,
//! }
//! ```
//!
//! # Layout rules
//!
//! Offsets follow the Metal `simd` rules, which agree with WGSL storage
//! layout as long as a three-component vector carries its trailing pad:
//!
//! | Rust type | GPU type | WGSL type | Size | Alignment |
//! |-----------|----------|-----------|------|-----------|
//! | `f32` | `f32` | `f32` | 4 | 4 |
//! | `u32` | `u32` | `u32` | 4 | 4 |
//! | `i32` | `i32` | `i32` | 4 | 4 |
//! | `bool` | `f32` (0.0 / 1.0) | `f32` | 4 | 4 |
//! | `#[index] u32` | `f32` | `f32` | 4 | 4 |
//! | `Vec2` | `[f32; 2]` | `vec2<f32>` | 8 | 8 |
//! | `Vec3` | `[f32; 3]` + pad | `vec3<f32>` | 16 | 16 |
//! | `Vec4` | `[f32; 4]` | `vec4<f32>` | 16 | 16 |
//! | `Mat4` | `[[f32; 4]; 4]` | `mat4x4<f32>` | 64 | 16 |
//!
//! The record size is rounded up to the largest alignment of its fields.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Ident, Type};

/// Derive macro for GPU records.
///
/// # Field attributes
///
/// - `#[index]` on a `u32` field stores the value in an `f32` slot, for
///   shaders that keep integer ids in float storage. Values up to 2^24 are
///   exact.
///
/// `bool` fields need no attribute: they are always stored as a 0.0 / 1.0
/// float flag.
///
/// # Generated code
///
/// For a record `Simulation { position: Vec4 }` the macro generates:
///
/// ```ignore
/// #[repr(C)]
/// #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
/// pub struct SimulationGpu {
///     pub position: [f32; 4],
/// }
///
/// impl shader_types::GpuRecord for Simulation {
///     type Gpu = SimulationGpu;
///     const WGSL_NAME: &'static str = "Simulation";
///     const WGSL_STRUCT: &'static str = "struct Simulation {\n    position: vec4<f32>,\n}";
///     // ...
/// }
/// ```
///
/// # Panics
///
/// The macro panics at compile time if:
/// - Applied to an enum or union
/// - The struct uses tuple or unit fields
/// - A field has an unsupported type
/// - `#[index]` is put on anything but a `u32`
#[proc_macro_derive(GpuRecord, attributes(index))]
pub fn derive_gpu_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();
    let gpu_name = Ident::new(&format!("{}Gpu", name), Span::call_site());

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("GpuRecord derive only supports structs with named fields"),
        },
        _ => panic!("GpuRecord derive only supports structs"),
    };

    let mut wgsl_fields = Vec::new();
    let mut gpu_struct_fields = Vec::new();
    let mut to_gpu_conversions = Vec::new();
    let mut from_gpu_conversions = Vec::new();
    let mut inspect_field_entries = Vec::new();
    let mut field_layouts = Vec::new();
    let mut field_offset = 0u32;
    let mut padding_count = 0u32;
    let mut record_align = 4u32;

    for field in fields.iter() {
        let field_name = field.ident.as_ref().unwrap();
        let field_name_str = field_name.to_string();
        let field_type = &field.ty;
        let is_index = field.attrs.iter().any(|attr| attr.path().is_ident("index"));
        let type_info = rust_type_info(field_type, is_index);
        record_align = record_align.max(type_info.align);

        // Alignment padding in front of the field
        let padding_needed = (type_info.align - (field_offset % type_info.align)) % type_info.align;
        if padding_needed > 0 {
            let pad = padding_field(padding_count, padding_needed);
            padding_count += 1;
            pad.push_into(&mut wgsl_fields, &mut gpu_struct_fields, &mut to_gpu_conversions);
            field_offset += padding_needed;
        }

        let kind = &type_info.kind;
        field_layouts.push(quote! {
            shader_types::FieldLayout {
                name: #field_name_str,
                offset: #field_offset,
                kind: shader_types::FieldKind::#kind,
            }
        });

        wgsl_fields.push(format!("    {}: {},", field_name_str, type_info.wgsl_type));

        let gpu_field_type = &type_info.gpu_type;
        gpu_struct_fields.push(quote! { #field_name: #gpu_field_type });

        let conversion = generate_conversion(field_name, &type_info.kind_name);
        to_gpu_conversions.push(quote! { #field_name: #conversion });

        let reverse_conversion = generate_reverse_conversion(field_name, &type_info.kind_name);
        from_gpu_conversions.push(quote! { #field_name: #reverse_conversion });

        let inspect_format = generate_inspect_format(field_name, &type_info.kind_name);
        inspect_field_entries.push(quote! { (#field_name_str, #inspect_format) });

        field_offset += type_info.size;

        // simd_float3 occupies a full 16 bytes
        if type_info.tail > 0 {
            let pad = padding_field(padding_count, type_info.tail);
            padding_count += 1;
            pad.push_into(&mut wgsl_fields, &mut gpu_struct_fields, &mut to_gpu_conversions);
            field_offset += type_info.tail;
        }
    }

    let final_padding = (record_align - (field_offset % record_align)) % record_align;
    if final_padding > 0 {
        let pad = padding_field(padding_count, final_padding);
        pad.push_into(&mut wgsl_fields, &mut gpu_struct_fields, &mut to_gpu_conversions);
        field_offset += final_padding;
    }
    let record_size = field_offset as usize;

    let wgsl_struct = format!("struct {} {{\n{}\n}}", name_str, wgsl_fields.join("\n"));

    let expanded = quote! {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        pub struct #gpu_name {
            #(pub #gpu_struct_fields),*
        }

        const _: () = assert!(::core::mem::size_of::<#gpu_name>() == #record_size);

        impl shader_types::GpuRecord for #name {
            type Gpu = #gpu_name;

            const WGSL_NAME: &'static str = #name_str;
            const WGSL_STRUCT: &'static str = #wgsl_struct;
            const FIELDS: &'static [shader_types::FieldLayout] = &[
                #(#field_layouts),*
            ];
            const ALIGN: u32 = #record_align;

            fn to_gpu(&self) -> Self::Gpu {
                #gpu_name {
                    #(#to_gpu_conversions),*
                }
            }

            fn from_gpu(gpu: &Self::Gpu) -> Self {
                Self {
                    #(#from_gpu_conversions),*
                }
            }

            fn inspect_fields(&self) -> Vec<(&'static str, String)> {
                vec![
                    #(#inspect_field_entries),*
                ]
            }
        }
    };

    TokenStream::from(expanded)
}

/// A generated `_padN` slot.
struct Padding {
    wgsl: String,
    field: proc_macro2::TokenStream,
    init: proc_macro2::TokenStream,
}

impl Padding {
    fn push_into(
        self,
        wgsl_fields: &mut Vec<String>,
        gpu_struct_fields: &mut Vec<proc_macro2::TokenStream>,
        to_gpu_conversions: &mut Vec<proc_macro2::TokenStream>,
    ) {
        wgsl_fields.push(self.wgsl);
        gpu_struct_fields.push(self.field);
        to_gpu_conversions.push(self.init);
    }
}

/// Build a padding slot of `bytes` bytes (always a multiple of 4).
fn padding_field(index: u32, bytes: u32) -> Padding {
    let pad_name_str = format!("_pad{}", index);
    let pad_name = Ident::new(&pad_name_str, Span::call_site());

    if bytes == 4 {
        Padding {
            wgsl: format!("    {}: f32,", pad_name_str),
            field: quote! { #pad_name: f32 },
            init: quote! { #pad_name: 0.0 },
        }
    } else {
        let count = (bytes / 4) as usize;
        Padding {
            wgsl: format!("    {}: array<f32, {}>,", pad_name_str, count),
            field: quote! { #pad_name: [f32; #count] },
            init: quote! { #pad_name: [0.0; #count] },
        }
    }
}

/// Type metadata for GPU memory layout calculations.
struct TypeInfo {
    /// Variant of `shader_types::FieldKind`
    kind: proc_macro2::TokenStream,
    /// Same variant as a string, used to pick conversions
    kind_name: &'static str,
    /// WGSL type name (e.g., "vec3<f32>")
    wgsl_type: &'static str,
    /// Rust type for the GPU struct (e.g., `[f32; 3]`)
    gpu_type: proc_macro2::TokenStream,
    /// Size in bytes, without the trailing pad
    size: u32,
    /// Required alignment in bytes
    align: u32,
    /// Trailing pad that belongs to the type itself
    tail: u32,
}

/// Get type information for a Rust type.
fn rust_type_info(ty: &Type, is_index: bool) -> TypeInfo {
    let type_str = quote!(#ty).to_string().replace(' ', "");

    if is_index && type_str != "u32" {
        panic!("#[index] is only supported on u32 fields, found: {}", type_str);
    }

    match type_str.as_str() {
        "f32" => scalar(quote! { Float }, "Float", "f32", quote! { f32 }),
        "u32" if is_index => scalar(quote! { Index }, "Index", "f32", quote! { f32 }),
        "u32" => scalar(quote! { Uint }, "Uint", "u32", quote! { u32 }),
        "i32" => scalar(quote! { Sint }, "Sint", "i32", quote! { i32 }),
        "bool" => scalar(quote! { Flag }, "Flag", "f32", quote! { f32 }),
        "Vec2" | "glam::Vec2" => TypeInfo {
            kind: quote! { Float2 },
            kind_name: "Float2",
            wgsl_type: "vec2<f32>",
            gpu_type: quote! { [f32; 2] },
            size: 8,
            align: 8,
            tail: 0,
        },
        "Vec3" | "glam::Vec3" => TypeInfo {
            kind: quote! { Float3 },
            kind_name: "Float3",
            wgsl_type: "vec3<f32>",
            gpu_type: quote! { [f32; 3] },
            size: 12,
            align: 16,
            tail: 4,
        },
        "Vec4" | "glam::Vec4" => TypeInfo {
            kind: quote! { Float4 },
            kind_name: "Float4",
            wgsl_type: "vec4<f32>",
            gpu_type: quote! { [f32; 4] },
            size: 16,
            align: 16,
            tail: 0,
        },
        "Mat4" | "glam::Mat4" => TypeInfo {
            kind: quote! { Float4x4 },
            kind_name: "Float4x4",
            wgsl_type: "mat4x4<f32>",
            gpu_type: quote! { [[f32; 4]; 4] },
            size: 64,
            align: 16,
            tail: 0,
        },
        _ => panic!("Unsupported type in GpuRecord struct: {}", type_str),
    }
}

fn scalar(
    kind: proc_macro2::TokenStream,
    kind_name: &'static str,
    wgsl_type: &'static str,
    gpu_type: proc_macro2::TokenStream,
) -> TypeInfo {
    TypeInfo {
        kind,
        kind_name,
        wgsl_type,
        gpu_type,
        size: 4,
        align: 4,
        tail: 0,
    }
}

/// Generate code to convert a field from host to GPU format.
fn generate_conversion(field_name: &Ident, kind_name: &str) -> proc_macro2::TokenStream {
    match kind_name {
        "Float2" | "Float3" | "Float4" => quote! { self.#field_name.to_array() },
        "Float4x4" => quote! { self.#field_name.to_cols_array_2d() },
        "Flag" => quote! { shader_types::encoding::encode_flag(self.#field_name) },
        "Index" => quote! { shader_types::encoding::encode_index(self.#field_name) },
        _ => quote! { self.#field_name },
    }
}

/// Generate code to convert a field from GPU format back to the host type.
fn generate_reverse_conversion(field_name: &Ident, kind_name: &str) -> proc_macro2::TokenStream {
    match kind_name {
        "Float2" => quote! { shader_types::glam::Vec2::from_array(gpu.#field_name) },
        "Float3" => quote! { shader_types::glam::Vec3::from_array(gpu.#field_name) },
        "Float4" => quote! { shader_types::glam::Vec4::from_array(gpu.#field_name) },
        "Float4x4" => quote! { shader_types::glam::Mat4::from_cols_array_2d(&gpu.#field_name) },
        "Flag" => quote! { shader_types::encoding::decode_flag(gpu.#field_name) },
        "Index" => quote! { shader_types::encoding::decode_index(gpu.#field_name) },
        _ => quote! { gpu.#field_name },
    }
}

/// Generate code to format a field for inspection output.
fn generate_inspect_format(field_name: &Ident, kind_name: &str) -> proc_macro2::TokenStream {
    match kind_name {
        "Float2" => quote! {
            format!("({:.3}, {:.3})", self.#field_name.x, self.#field_name.y)
        },
        "Float3" => quote! {
            format!("({:.3}, {:.3}, {:.3})", self.#field_name.x, self.#field_name.y, self.#field_name.z)
        },
        "Float4" => quote! {
            format!(
                "({:.3}, {:.3}, {:.3}, {:.3})",
                self.#field_name.x, self.#field_name.y, self.#field_name.z, self.#field_name.w
            )
        },
        "Float" => quote! { format!("{:.3}", self.#field_name) },
        _ => quote! { format!("{:?}", self.#field_name) },
    }
}
