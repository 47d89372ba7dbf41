//! Class-file model: the structural view of a parsed `.class` file that the
//! disassembler renders from.
//!
//! Names are stored in internal (slash-separated) form exactly as they appear
//! in the constant pool; conversion to source form happens at render time.
//! The model assumes the binary parser already validated the file, so there
//! are no index fields left to resolve and no error states to carry.

use bitflags::bitflags;

bitflags! {
    /// Access and property flags, covering class, member, parameter and
    /// module positions.
    ///
    /// Several JVM flags share a bit and are disambiguated by position:
    /// `SUPER`/`SYNCHRONIZED`/`OPEN`/`TRANSITIVE`, `VOLATILE`/`BRIDGE`/
    /// `STATIC_PHASE`, `TRANSIENT`/`VARARGS` and `MODULE`/`MANDATED` are
    /// aliases for the same bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const OPEN = 0x0020;
        const TRANSITIVE = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const STATIC_PHASE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;
        const MANDATED = 0x8000;
    }
}

/// A parsed class file, ready for rendering.
#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: AccessFlags,
    /// Internal form, e.g. `com/example/Outer$Inner`.
    pub class_name: String,
    /// `None` only for `java/lang/Object` and module descriptors.
    pub superclass_name: Option<String>,
    pub interface_names: Vec<String>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Vec<Attribute>,
    pub constant_pool: ConstantPool,
}

impl ClassFile {
    pub fn is_interface(&self) -> bool {
        self.access_flags.contains(AccessFlags::INTERFACE)
    }

    pub fn is_enum(&self) -> bool {
        self.access_flags.contains(AccessFlags::ENUM)
    }

    pub fn is_annotation(&self) -> bool {
        self.access_flags.contains(AccessFlags::ANNOTATION)
    }

    pub fn is_module(&self) -> bool {
        self.access_flags.contains(AccessFlags::MODULE)
    }

    pub fn is_record(&self) -> bool {
        self.superclass_name.as_deref() == Some("java/lang/Record")
    }

    pub fn is_deprecated(&self) -> bool {
        has_deprecated(&self.attributes)
    }

    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNTHETIC) || has_synthetic(&self.attributes)
    }

    pub fn source_file(&self) -> Option<&str> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::SourceFile(name) => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn signature(&self) -> Option<&str> {
        find_signature(&self.attributes)
    }

    pub fn inner_classes(&self) -> Option<&[InnerClass]> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::InnerClasses(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    pub fn module(&self) -> Option<&ModuleAttribute> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::Module(module) => Some(module),
            _ => None,
        })
    }
}

/// One `field_info` structure.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name: String,
    /// Field descriptor, e.g. `[Ljava/lang/String;`.
    pub descriptor: String,
    pub attributes: Vec<Attribute>,
}

impl FieldInfo {
    pub fn is_deprecated(&self) -> bool {
        has_deprecated(&self.attributes)
    }

    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNTHETIC) || has_synthetic(&self.attributes)
    }

    pub fn signature(&self) -> Option<&str> {
        find_signature(&self.attributes)
    }

    pub fn constant_value(&self) -> Option<&ConstantValue> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::ConstantValue(value) => Some(value),
            _ => None,
        })
    }
}

/// One `method_info` structure.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    /// `<init>` and `<clinit>` keep their internal names.
    pub name: String,
    /// Method descriptor, e.g. `(II)V`.
    pub descriptor: String,
    pub attributes: Vec<Attribute>,
}

impl MethodInfo {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_clinit(&self) -> bool {
        self.name == "<clinit>"
    }

    pub fn is_deprecated(&self) -> bool {
        has_deprecated(&self.attributes)
    }

    pub fn is_synthetic(&self) -> bool {
        self.access_flags.contains(AccessFlags::SYNTHETIC) || has_synthetic(&self.attributes)
    }

    pub fn signature(&self) -> Option<&str> {
        find_signature(&self.attributes)
    }

    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::Code(code) => Some(code),
            _ => None,
        })
    }

    pub fn exceptions(&self) -> Option<&[String]> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::Exceptions(names) => Some(names.as_slice()),
            _ => None,
        })
    }

    pub fn method_parameters(&self) -> Option<&[MethodParameter]> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::MethodParameters(parameters) => Some(parameters.as_slice()),
            _ => None,
        })
    }

    pub fn annotation_default(&self) -> Option<&AnnotationValue> {
        self.attributes.iter().find_map(|a| match a {
            Attribute::AnnotationDefault(value) => Some(value),
            _ => None,
        })
    }
}

fn has_deprecated(attributes: &[Attribute]) -> bool {
    attributes.iter().any(|a| matches!(a, Attribute::Deprecated))
}

fn has_synthetic(attributes: &[Attribute]) -> bool {
    attributes.iter().any(|a| matches!(a, Attribute::Synthetic))
}

fn find_signature(attributes: &[Attribute]) -> Option<&str> {
    attributes.iter().find_map(|a| match a {
        Attribute::Signature(signature) => Some(signature.as_str()),
        _ => None,
    })
}

pub(crate) fn visible_annotations(attributes: &[Attribute]) -> Option<&[Annotation]> {
    attributes.iter().find_map(|a| match a {
        Attribute::RuntimeVisibleAnnotations(annotations) => Some(annotations.as_slice()),
        _ => None,
    })
}

pub(crate) fn invisible_annotations(attributes: &[Attribute]) -> Option<&[Annotation]> {
    attributes.iter().find_map(|a| match a {
        Attribute::RuntimeInvisibleAnnotations(annotations) => Some(annotations.as_slice()),
        _ => None,
    })
}

/// Structural attributes the renderer understands, with a generic fallback
/// for everything else.
#[derive(Debug, Clone)]
pub enum Attribute {
    SourceFile(String),
    Signature(String),
    ConstantValue(ConstantValue),
    Code(CodeAttribute),
    Exceptions(Vec<String>),
    InnerClasses(Vec<InnerClass>),
    EnclosingMethod {
        class_name: String,
        /// Name and descriptor; absent for code directly in an initializer.
        method: Option<(String, String)>,
    },
    Synthetic,
    Deprecated,
    RuntimeVisibleAnnotations(Vec<Annotation>),
    RuntimeInvisibleAnnotations(Vec<Annotation>),
    AnnotationDefault(AnnotationValue),
    MethodParameters(Vec<MethodParameter>),
    NestHost(String),
    NestMembers(Vec<String>),
    PermittedSubclasses(Vec<String>),
    Record(Vec<RecordComponent>),
    Module(ModuleAttribute),
    ModulePackages(Vec<String>),
    ModuleMainClass(String),
    /// Unrecognized attribute; only its header is rendered.
    Other { name: String, length: u32 },
}

/// A `ConstantValue` attribute payload.
#[derive(Debug, Clone)]
pub enum ConstantValue {
    Integer(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

/// The parts of a `Code` attribute the disassembler uses.
#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub local_variable_table: Vec<LocalVariable>,
}

/// One `LocalVariableTable` entry.
#[derive(Debug, Clone)]
pub struct LocalVariable {
    pub slot: u16,
    pub name: String,
    pub descriptor: String,
}

/// One `MethodParameters` entry.
#[derive(Debug, Clone)]
pub struct MethodParameter {
    pub name: Option<String>,
    pub access_flags: AccessFlags,
}

/// One `InnerClasses` table entry.
#[derive(Debug, Clone)]
pub struct InnerClass {
    pub inner_class_name: Option<String>,
    pub outer_class_name: Option<String>,
    pub inner_name: Option<String>,
    pub access_flags: AccessFlags,
}

/// One `Record` attribute component.
#[derive(Debug, Clone)]
pub struct RecordComponent {
    pub name: String,
    pub descriptor: String,
}

/// A runtime-visible or -invisible annotation.
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Field descriptor form, e.g. `Ljava/lang/Deprecated;`.
    pub type_name: String,
    pub components: Vec<(String, AnnotationValue)>,
}

/// A tagged annotation component value, rendered recursively.
#[derive(Debug, Clone)]
pub enum AnnotationValue {
    Byte(i32),
    Char(char),
    Short(i32),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(String),
    Enum {
        /// Field descriptor form of the enum type.
        type_name: String,
        constant_name: String,
    },
    /// Class literal, field descriptor form.
    Class(String),
    Annotation(Box<Annotation>),
    Array(Vec<AnnotationValue>),
}

/// The `Module` attribute.
#[derive(Debug, Clone)]
pub struct ModuleAttribute {
    pub name: String,
    pub flags: AccessFlags,
    pub version: Option<String>,
    pub requires: Vec<ModuleRequires>,
    pub exports: Vec<PackageVisibility>,
    pub opens: Vec<PackageVisibility>,
    pub uses: Vec<String>,
    pub provides: Vec<ModuleProvides>,
}

#[derive(Debug, Clone)]
pub struct ModuleRequires {
    pub name: String,
    pub flags: AccessFlags,
    pub version: Option<String>,
}

/// An `exports` or `opens` entry with its optional `to` list.
#[derive(Debug, Clone)]
pub struct PackageVisibility {
    pub package: String,
    pub to: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModuleProvides {
    pub service: String,
    pub with: Vec<String>,
}

/// The constant pool as resolved, tagged entries.
///
/// Entries are stored in pool order starting at index 1; the second slot of
/// a `long`/`double` constant is represented by [`ConstantPoolEntry::Unusable`]
/// so indices printed by the SYSTEM dump line up with the binary.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    pub entries: Vec<ConstantPoolEntry>,
}

impl ConstantPool {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries paired with their 1-based pool index.
    pub fn indexed(&self) -> impl Iterator<Item = (usize, &ConstantPoolEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }
}

/// One constant pool entry with references already resolved to text.
#[derive(Debug, Clone)]
pub enum ConstantPoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(String),
    String(String),
    FieldRef {
        class_name: String,
        name: String,
        descriptor: String,
    },
    MethodRef {
        class_name: String,
        name: String,
        descriptor: String,
    },
    InterfaceMethodRef {
        class_name: String,
        name: String,
        descriptor: String,
    },
    NameAndType {
        name: String,
        descriptor: String,
    },
    MethodHandle {
        reference_kind: u8,
        description: String,
    },
    MethodType(String),
    Dynamic {
        bootstrap_method_index: u16,
        name: String,
        descriptor: String,
    },
    InvokeDynamic {
        bootstrap_method_index: u16,
        name: String,
        descriptor: String,
    },
    Module(String),
    Package(String),
    /// Second slot of a `long`/`double` entry.
    Unusable,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_positional_flag_aliases_share_bits() {
        assert_eq!(AccessFlags::BRIDGE, AccessFlags::VOLATILE);
        assert_eq!(AccessFlags::VARARGS, AccessFlags::TRANSIENT);
        assert_eq!(AccessFlags::MANDATED, AccessFlags::MODULE);
        assert_eq!(AccessFlags::OPEN, AccessFlags::SUPER);
    }

    #[test]
    fn test_synthetic_from_flag_or_attribute() {
        let mut field = FieldInfo {
            access_flags: AccessFlags::PRIVATE,
            name: "cache".to_owned(),
            descriptor: "I".to_owned(),
            attributes: Vec::new(),
        };
        assert!(!field.is_synthetic());
        field.attributes.push(Attribute::Synthetic);
        assert!(field.is_synthetic());

        let flagged = FieldInfo {
            access_flags: AccessFlags::PRIVATE | AccessFlags::SYNTHETIC,
            attributes: Vec::new(),
            ..field
        };
        assert!(flagged.is_synthetic());
    }

    #[test]
    fn test_constant_pool_indices_are_one_based() {
        let pool = ConstantPool {
            entries: vec![
                ConstantPoolEntry::Utf8("hello".to_owned()),
                ConstantPoolEntry::Long(7),
                ConstantPoolEntry::Unusable,
            ],
        };
        let indices: Vec<usize> = pool.indexed().map(|(i, _)| i).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }
}
