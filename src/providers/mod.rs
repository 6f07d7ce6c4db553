pub mod pydolar;
