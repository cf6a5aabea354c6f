use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// All errors must be Send + Sync so they can cross the registry lock
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Initializers may be resolved from any thread, and their products are shared
/// through the registry afterwards. So anything produced needs to be Send + Sync + 'static
pub trait Injectable: Send + Sync + 'static {}
impl<T: Send + Sync + 'static> Injectable for T {}

/// A produced, shared result of an initializer
#[derive(Clone)]
pub struct Instance {
    pub info: TypeInfo,
    pub instance: Arc<dyn Any + Send + Sync + 'static>,
}

impl Instance {
    pub(crate) fn new<Produced: Injectable>(instance: Produced) -> Self {
        Instance {
            info: TypeInfo::of::<Produced>(),
            instance: Arc::new(instance),
        }
    }

    pub fn downcast<T: Injectable>(&self) -> Result<Arc<T>, &'static str> {
        match Arc::downcast::<T>(self.instance.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.info.type_name),
        }
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.info.type_name).finish()
    }
}

/// Type Name and Type Id
///
/// Used as the key of an initializer. The type name is the fully qualified
/// identity metadata entries refer to.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub struct TypeInfo {
    pub type_name: &'static str,
    pub type_id: TypeId,
}
impl std::fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name)
    }
}
impl TypeInfo {
    pub fn of<T: 'static + ?Sized>() -> TypeInfo {
        TypeInfo {
            type_name: std::any::type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    /// The type name without its module path, generic arguments are kept
    ///
    /// `my_app::db::DbInit<my_app::Pg>` -> `DbInit<my_app::Pg>`
    pub fn short_name(&self) -> &'static str {
        let path = match self.type_name.find('<') {
            Some(generics) => &self.type_name[..generics],
            None => self.type_name,
        };
        match path.rfind("::") {
            Some(idx) => &self.type_name[idx + 2..],
            None => self.type_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod nested {
        pub struct Leaf;
        pub struct Generic<T>(pub T);
    }

    #[test]
    fn short_name_strips_module_path() {
        assert_eq!(TypeInfo::of::<nested::Leaf>().short_name(), "Leaf");
        assert_eq!(TypeInfo::of::<u32>().short_name(), "u32");
    }

    #[test]
    fn short_name_keeps_generic_arguments() {
        let info = TypeInfo::of::<nested::Generic<nested::Leaf>>();
        let short = info.short_name();
        assert!(short.starts_with("Generic<"), "got {short}");
        assert!(short.ends_with("Leaf>"), "got {short}");
    }

    #[test]
    fn instance_downcast_reports_actual_type() {
        let instance = Instance::new(5_u8);
        assert_eq!(*instance.downcast::<u8>().unwrap(), 5);
        assert_eq!(instance.downcast::<String>().unwrap_err(), "u8");
    }
}
