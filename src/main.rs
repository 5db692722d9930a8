fn main() {
    polmatrix::cli::run();
}
