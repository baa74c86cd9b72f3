mod credential_rotation_test;
