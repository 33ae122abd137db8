fn main() {
    batchrun::cli::run();
}
