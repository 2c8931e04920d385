fn main() -> anyhow::Result<()> {
    qfmap::run()
}
