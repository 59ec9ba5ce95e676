pub(crate) mod object_id;
