mod test_uv_layout;
