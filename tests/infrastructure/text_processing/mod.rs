mod composite_extractor_test;
mod link_extractor_test;
