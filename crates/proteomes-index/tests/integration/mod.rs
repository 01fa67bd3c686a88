mod index_service;
mod properties;
