//! IR modules.

use crate::function::Function;
use crate::types::IrType;

/// A compilation unit of functions plus a table of named struct types.
///
/// Struct names are registered once; later references use
/// [`IrType::Named`] and resolve through [`Module::struct_body`].
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub name: String,
    functions: Vec<Function>,
    structs: Vec<(String, Vec<IrType>)>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Module {
            name: name.into(),
            functions: Vec::new(),
            structs: Vec::new(),
        }
    }

    pub fn add_function(&mut self, func: Function) {
        self.functions.push(func);
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter()
    }

    /// Registers a named struct type.
    ///
    /// # Panics
    ///
    /// Panics if `name` is already registered; naming is one-time.
    pub fn add_struct(&mut self, name: impl Into<String>, fields: Vec<IrType>) -> IrType {
        let name = name.into();
        assert!(
            self.struct_body(&name).is_none(),
            "struct type is already named"
        );
        self.structs.push((name.clone(), fields));
        IrType::Named(name)
    }

    /// The field list of a registered named struct.
    pub fn struct_body(&self, name: &str) -> Option<&[IrType]> {
        self.structs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fields)| fields.as_slice())
    }

    pub fn structs(&self) -> impl Iterator<Item = (&str, &[IrType])> {
        self.structs.iter().map(|(n, f)| (n.as_str(), f.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::Param;

    #[test]
    fn function_lookup_by_name() {
        let mut module = Module::new("m");
        module.add_function(Function::new("main", vec![], IrType::Void, false));
        assert!(module.function("main").is_some());
        assert!(module.function("other").is_none());
    }

    #[test]
    fn named_struct_round_trips() {
        let mut module = Module::new("m");
        let ty = module.add_struct("Point", vec![IrType::Int(64), IrType::Int(64)]);
        assert_eq!(ty, IrType::Named("Point".into()));
        assert_eq!(
            module.struct_body("Point"),
            Some(&[IrType::Int(64), IrType::Int(64)][..])
        );
    }

    #[test]
    #[should_panic(expected = "already named")]
    fn renaming_a_struct_panics() {
        let mut module = Module::new("m");
        module.add_struct("Point", vec![IrType::Int(64)]);
        module.add_struct("Point", vec![IrType::Double]);
    }

    #[test]
    fn functions_iterate_in_insertion_order() {
        let mut module = Module::new("m");
        module.add_function(Function::new("a", vec![], IrType::Void, false));
        module.add_function(Function::new(
            "b",
            vec![Param::new("x", IrType::Int(64))],
            IrType::Int(64),
            false,
        ));
        let names: Vec<_> = module.functions().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
