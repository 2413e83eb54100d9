fn main() {
    prost_build::compile_protos(&["proto/icp.proto"], &["proto/"])
        .expect("failed to compile icp.proto");
}
