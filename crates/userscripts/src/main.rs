fn main() -> anyhow::Result<()> {
    userscripts::cli::run()
}
