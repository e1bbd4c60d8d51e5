/// A key-value pair stored in a tree node. Sets use `U = ()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<T, U> {
    pub key: T,
    pub value: U,
}
